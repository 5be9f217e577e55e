use anyhow::Result;

use crate::{
    config::{Config, TxtMode},
    formats::time::encode,
    model::Transcript,
};

/// Placeholder range written ahead of each sentence in template mode.
pub const TEMPLATE_LINE: &str = "[HH:MM:SS,MS --> HH:MM:SS,MS]";

pub fn write_txt(t: &Transcript, cfg: &Config) -> Result<String> {
    let mut out = String::new();

    for cue in &t.cues {
        match cfg.formats.txt.mode {
            TxtMode::TextOnly => {}
            TxtMode::TimestampRange => {
                out.push_str(&format!("[{} --> {}] ", encode(cue.start)?, encode(cue.end)?));
            }
            TxtMode::Template => {
                out.push_str(TEMPLATE_LINE);
                out.push('\n');
            }
        }
        out.push_str(cue.text.trim());
        out.push('\n');
    }

    Ok(out)
}
