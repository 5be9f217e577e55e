use anyhow::{Context, Result};
use textwrap::wrap;

use crate::{
    config::Config,
    formats::time::{encode, ms_to_seconds, parse_time_range_arrow},
    model::{Cue, Transcript},
};

pub fn write_srt(t: &Transcript, cfg: &Config) -> Result<String> {
    let mut out = String::new();

    for cue in &t.cues {
        out.push_str(&cue.index.to_string());
        out.push('\n');

        out.push_str(&format!(
            "{} --> {}\n",
            encode(cue.start).with_context(|| format!("cue {} start", cue.index))?,
            encode(cue.end).with_context(|| format!("cue {} end", cue.index))?
        ));

        let width = cfg.formats.srt.wrap_width;
        if width == 0 {
            out.push_str(cue.text.trim());
            out.push('\n');
        } else {
            for line in wrap(cue.text.trim(), width) {
                out.push_str(&line);
                out.push('\n');
            }
        }

        out.push('\n');
    }

    Ok(out)
}

/// Read SRT blocks back into cues, renumbered from 1.
///
/// Multi-line cue text is joined with single spaces; blocks without text are
/// dropped.
pub fn parse_srt(raw: &str) -> Result<Vec<Cue>> {
    let normalized = raw.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut cues: Vec<Cue> = Vec::new();

    for (block_no, block) in normalized.split("\n\n").enumerate() {
        let mut lines = block.lines().map(str::trim).filter(|l| !l.is_empty());
        let Some(first) = lines.next() else {
            continue;
        };

        let timing = if first.contains("-->") {
            first
        } else {
            lines
                .next()
                .with_context(|| format!("SRT block {} has no timing line", block_no + 1))?
        };
        let (start, end) = parse_time_range_arrow(timing)
            .with_context(|| format!("SRT block {} has a bad timing line", block_no + 1))?;

        let text = lines.collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            tracing::debug!(block = block_no + 1, "skipping SRT block without text");
            continue;
        }

        cues.push(Cue {
            index: cues.len() + 1,
            start: ms_to_seconds(start),
            end: ms_to_seconds(end),
            text,
        });
    }

    Ok(cues)
}
