use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::TimeUnits,
    formats::time::seconds_to_ms,
    model::{Transcript, WordToken},
};

#[derive(Debug, Clone, Serialize)]
pub struct WrappedJson<'a> {
    pub schema: &'static str,
    pub version: u32,
    pub cues: Vec<JsonCue<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonCue<'a> {
    pub index: usize,
    pub start: Value,
    pub end: Value,
    pub text: &'a str,
}

pub fn write_json(t: &Transcript, units: TimeUnits, wrapped: bool) -> Result<String> {
    let cues = t
        .cues
        .iter()
        .map(|c| -> Result<JsonCue<'_>> {
            Ok(JsonCue {
                index: c.index,
                start: encode_time(c.start, units)?,
                end: encode_time(c.end, units)?,
                text: c.text.as_str(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if wrapped {
        let w = WrappedJson {
            schema: "subcue.cues",
            version: 1,
            cues,
        };
        Ok(serde_json::to_string_pretty(&w)?)
    } else {
        Ok(serde_json::to_string_pretty(&cues)?)
    }
}

fn encode_time(seconds: f64, units: TimeUnits) -> Result<Value> {
    let ms = seconds_to_ms(seconds)?;
    Ok(match units {
        TimeUnits::Ms => Value::from(ms),
        TimeUnits::Seconds => Value::from(ms as f64 / 1000.0),
    })
}

#[derive(Debug, Deserialize)]
struct RawWord {
    #[serde(alias = "word")]
    text: String,
    start: Option<f64>,
    end: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    #[serde(default)]
    words: Vec<RawWord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WordsDocument {
    Flat(Vec<RawWord>),
    Words { words: Vec<RawWord> },
    Segments { segments: Vec<RawSegment> },
}

/// Words read from an engine dump, minus the ones without timing.
#[derive(Debug, Clone, Default)]
pub struct ParsedWords {
    pub tokens: Vec<WordToken>,
    pub dropped: usize,
}

/// Accepts a bare word array, `{"words": [...]}`, or
/// `{"segments": [{"words": [...]}]}`.
pub fn parse_words(input: &str) -> Result<ParsedWords> {
    let doc: WordsDocument =
        serde_json::from_str(input).context("unrecognized word-timestamp JSON shape")?;

    let raw = match doc {
        WordsDocument::Flat(words) | WordsDocument::Words { words } => words,
        WordsDocument::Segments { segments } => {
            segments.into_iter().flat_map(|s| s.words).collect()
        }
    };

    let mut parsed = ParsedWords::default();
    for w in raw {
        match (w.start, w.end) {
            (Some(start), Some(end)) => parsed.tokens.push(WordToken::new(w.text, start, end)),
            _ => parsed.dropped += 1,
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cue;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_flat_array_drops_untimed_words() {
        let parsed = parse_words(
            r#"[
                {"text": "Hello", "start": 0.0, "end": 0.4},
                {"text": "uh", "start": null, "end": 0.6},
                {"word": "world.", "start": 0.5, "end": 0.9}
            ]"#,
        )
        .unwrap();

        assert_eq!(parsed.dropped, 1);
        assert_eq!(parsed.tokens.len(), 2);
        assert_eq!(parsed.tokens[1].text, "world.");
        assert_relative_eq!(parsed.tokens[1].end, 0.9);
    }

    #[test]
    fn test_parse_words_object() {
        let parsed = parse_words(r#"{"words": [{"text": "Hi", "start": 1, "end": 2}]}"#).unwrap();
        assert_eq!(parsed.tokens, vec![WordToken::new("Hi", 1.0, 2.0)]);
    }

    #[test]
    fn test_parse_segments_flattens_in_order() {
        let parsed = parse_words(
            r#"{"segments": [
                {"text": "a b", "words": [{"word": " a", "start": 0.0, "end": 0.1},
                                          {"word": " b", "start": 0.2, "end": 0.3}]},
                {"text": "c", "words": [{"word": " c", "start": 0.4, "end": 0.5}]},
                {"text": "no words"}
            ]}"#,
        )
        .unwrap();

        let texts: Vec<&str> = parsed.tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, [" a", " b", " c"]);
        assert_eq!(parsed.dropped, 0);
    }

    #[test]
    fn test_parse_rejects_unknown_shape() {
        assert!(parse_words(r#"{"cues": []}"#).is_err());
    }

    #[test]
    fn test_write_json_wrapped_in_ms() {
        let t = Transcript::new(vec![Cue {
            index: 1,
            start: 0.0,
            end: 0.9,
            text: "Hello world.".to_string(),
        }]);

        let out = write_json(&t, TimeUnits::Ms, true).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["schema"], "subcue.cues");
        assert_eq!(v["cues"][0]["index"], 1);
        assert_eq!(v["cues"][0]["end"], 900);
        assert_eq!(v["cues"][0]["text"], "Hello world.");
    }

    #[test]
    fn test_write_json_bare_array_in_seconds() {
        let t = Transcript::new(vec![Cue {
            index: 1,
            start: 1.2345,
            end: 2.0,
            text: "x".to_string(),
        }]);

        let out = write_json(&t, TimeUnits::Seconds, false).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v[0]["start"], 1.235);
    }
}
