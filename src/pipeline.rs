use anyhow::{Context, Result, anyhow, bail};
use std::{fs, path::Path};

use crate::{
    cli::{Format, InputFormat, SegmentCmd},
    config::Config,
    formats::{self, json::ParsedWords},
    model::Transcript,
    report::ErrorReporter,
    segment::{SegmentSource, Segmenter, SegmenterConfig},
};

/// Segment every input in turn. A failing input is handed to `reporter` and
/// the rest still run; the call fails afterwards if any input did.
pub fn run_segment(cmd: SegmentCmd, cfg: &Config, reporter: &dyn ErrorReporter) -> Result<()> {
    if cmd.output.is_some() && cmd.inputs.len() > 1 {
        bail!("--output can only be used with a single input");
    }

    let segmenter = Segmenter::new(effective_segmenter_config(&cmd, &cfg.segmenter))
        .context("invalid segmenter settings")?;

    let mut failed = 0usize;
    for input in &cmd.inputs {
        if let Err(err) = process_input(input, &cmd, cfg, &segmenter) {
            reporter.report(&err.context(format!("failed processing {input}")));
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(anyhow!("{failed} of {} inputs failed", cmd.inputs.len()));
    }
    Ok(())
}

pub fn effective_segmenter_config(cmd: &SegmentCmd, base: &SegmenterConfig) -> SegmenterConfig {
    SegmenterConfig {
        max_pause: cmd.max_pause.unwrap_or(base.max_pause),
        synthetic_duration: cmd.synthetic_duration.unwrap_or(base.synthetic_duration),
        abbreviation_guard: base.abbreviation_guard && !cmd.no_abbreviation_guard,
    }
}

fn process_input(input: &str, cmd: &SegmentCmd, cfg: &Config, segmenter: &Segmenter) -> Result<()> {
    let span = tracing::info_span!("segment", input = input, to = ?cmd.to);
    let _g = span.enter();

    let input_format = cmd
        .from
        .unwrap_or_else(|| infer_format_from_path_or_dash(input));
    tracing::info!(?input_format, "input format selected");

    let raw = read_input_to_string(input)?;
    tracing::info!(bytes = raw.len(), "read input");

    let transcript = build_transcript(&raw, input_format, segmenter)
        .with_context(|| format!("failed reading input as {:?}", input_format))?;

    log_transcript_summary(&transcript, cfg);

    let rendered = render_any(&transcript, cmd.to, cfg)?;

    if cmd.stdout {
        print!("{rendered}");
        tracing::info!(mode = "stdout", "wrote output");
        return Ok(());
    }

    let out_path = derive_output_path(input, cmd)?;
    write_output(&out_path, &rendered, cmd.overwrite)?;
    tracing::info!(path = out_path.as_str(), "wrote output file");

    Ok(())
}

fn infer_format_from_path_or_dash(input: &str) -> InputFormat {
    if input == "-" {
        return InputFormat::Text;
    }
    let p = Path::new(input);
    match p
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
        .as_str()
    {
        "json" => InputFormat::Words,
        "srt" => InputFormat::Srt,
        _ => InputFormat::Text,
    }
}

fn read_input_to_string(input: &str) -> Result<String> {
    if input == "-" {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(input).with_context(|| format!("failed reading {input}"))
    }
}

pub fn build_transcript(raw: &str, fmt: InputFormat, segmenter: &Segmenter) -> Result<Transcript> {
    let trimmed = raw.trim_start();
    if fmt == InputFormat::Text && (trimmed.starts_with('{') || trimmed.starts_with('[')) {
        tracing::info!("input looks like JSON; attempting word-timestamp parse");
        match formats::json::parse_words(raw) {
            Ok(parsed) => return segment_words(parsed, segmenter),
            Err(err) => {
                tracing::info!(error = %err, "not word-timestamp JSON; reading as plain text")
            }
        }
    }

    match fmt {
        InputFormat::Words => segment_words(formats::json::parse_words(raw)?, segmenter),
        InputFormat::Text => {
            let cues = segmenter.segment(&segmenter.untimed(raw))?;
            Ok(Transcript::new(cues))
        }
        InputFormat::Srt => Ok(Transcript::new(formats::srt::parse_srt(raw)?)),
    }
}

fn segment_words(parsed: ParsedWords, segmenter: &Segmenter) -> Result<Transcript> {
    if parsed.dropped > 0 {
        tracing::info!(dropped = parsed.dropped, "skipped words without timing");
    }

    let cues = segmenter.segment(&SegmentSource::Timed(parsed.tokens))?;
    Ok(Transcript::new(cues))
}

fn log_transcript_summary(t: &Transcript, cfg: &Config) {
    tracing::info!(
        cues = t.cues.len(),
        duration_s = t.duration(),
        "transcript summary"
    );

    if tracing::enabled!(tracing::Level::DEBUG) {
        let n = cfg.logging.debug_cue_samples.min(t.cues.len());
        for c in t.cues.iter().take(n) {
            tracing::debug!(
                idx = c.index,
                start = c.start,
                end = c.end,
                chars = c.text.chars().count(),
                "cue sample"
            );
        }
    }
}

pub fn render_any(t: &Transcript, fmt: Format, cfg: &Config) -> Result<String> {
    match fmt {
        Format::Srt => formats::srt::write_srt(t, cfg),
        Format::Txt => formats::txt::write_txt(t, cfg),
        Format::Json => {
            formats::json::write_json(t, cfg.formats.json.time_units, cfg.formats.json.wrapped)
        }
    }
}

fn derive_output_path(input: &str, cmd: &SegmentCmd) -> Result<String> {
    if let Some(o) = &cmd.output {
        return Ok(o.clone());
    }

    if input == "-" {
        return Err(anyhow!(
            "output path required when input is stdin and --stdout is not set"
        ));
    }

    let p = Path::new(input);
    let stem = p
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("bad input filename"))?;

    let parent = p.parent().unwrap_or_else(|| Path::new("."));
    let ext = cmd.to.extension();
    let mut out = parent.join(format!("{stem}.{ext}"));
    if out == p {
        out = parent.join(format!("{stem}.cues.{ext}"));
    }
    Ok(out.to_string_lossy().to_string())
}

fn write_output(path: &str, data: &str, overwrite: bool) -> Result<()> {
    if Path::new(path).exists() && !overwrite {
        return Err(anyhow!(
            "refusing to overwrite existing file (pass --overwrite): {path}"
        ));
    }
    fs::write(path, data).with_context(|| format!("failed writing {path}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CueError;

    fn cmd(inputs: &[&str]) -> SegmentCmd {
        SegmentCmd {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            output: None,
            to: Format::Srt,
            from: None,
            stdout: false,
            overwrite: false,
            max_pause: None,
            synthetic_duration: None,
            no_abbreviation_guard: false,
            error_log: None,
        }
    }

    #[test]
    fn test_infer_input_format() {
        assert_eq!(infer_format_from_path_or_dash("-"), InputFormat::Text);
        assert_eq!(infer_format_from_path_or_dash("talk.JSON"), InputFormat::Words);
        assert_eq!(infer_format_from_path_or_dash("talk.srt"), InputFormat::Srt);
        assert_eq!(infer_format_from_path_or_dash("notes.txt"), InputFormat::Text);
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut c = cmd(&["a.json"]);
        c.max_pause = Some(0.25);
        c.no_abbreviation_guard = true;

        let eff = effective_segmenter_config(&c, &SegmenterConfig::default());
        assert_eq!(eff.max_pause, 0.25);
        assert_eq!(eff.synthetic_duration, 2.0);
        assert!(!eff.abbreviation_guard);
    }

    #[test]
    fn test_derive_output_path_avoids_clobbering_input() {
        let mut c = cmd(&["dir/notes.txt"]);
        c.to = Format::Txt;
        let out = derive_output_path("dir/notes.txt", &c).unwrap();
        assert_eq!(Path::new(&out), Path::new("dir/notes.cues.txt"));

        c.to = Format::Srt;
        let out = derive_output_path("dir/notes.txt", &c).unwrap();
        assert_eq!(Path::new(&out), Path::new("dir/notes.srt"));
    }

    #[test]
    fn test_stdin_needs_explicit_output() {
        assert!(derive_output_path("-", &cmd(&["-"])).is_err());
    }

    #[test]
    fn test_text_that_looks_like_json_is_read_as_words() {
        let seg = Segmenter::new(SegmenterConfig::default()).unwrap();
        let t = build_transcript(
            r#"[{"text": "Hi.", "start": 0.5, "end": 0.8}]"#,
            InputFormat::Text,
            &seg,
        )
        .unwrap();

        assert_eq!(t.cues.len(), 1);
        assert_eq!(t.cues[0].start, 0.5);
    }

    #[test]
    fn test_text_that_parses_as_words_keeps_token_errors() {
        let seg = Segmenter::new(SegmenterConfig::default()).unwrap();
        let err = build_transcript(
            r#"[{"text": "Hi.", "start": 1.0, "end": 0.5}]"#,
            InputFormat::Text,
            &seg,
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CueError>(),
            Some(CueError::InvalidToken { index: 0, .. })
        ));
    }

    #[test]
    fn test_bracketed_prose_falls_back_to_text() {
        let seg = Segmenter::new(SegmenterConfig::default()).unwrap();
        let t = build_transcript("[Music] Hello there.", InputFormat::Text, &seg).unwrap();

        assert_eq!(t.cues.len(), 1);
        assert_eq!(t.cues[0].text, "[Music] Hello there.");
    }
}
