//! Grouping of word tokens into sentence-level cues.
//!
//! A single greedy pass closes the current cue when a word ends a sentence,
//! when the silence before the next word exceeds `max_pause`, or when the
//! input runs out. Plain text without timing goes through the same fold with
//! every pause at zero and a synthetic clock that hands out fixed-length cues.

use serde::{Deserialize, Serialize};

use crate::{
    error::{CueError, CueResult},
    model::{Cue, WordToken},
};

/// Title abbreviations that end in a period without ending the sentence.
const ABBREVIATIONS: &[&str] = &["mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Silence in seconds after which a cue is closed.
    pub max_pause: f64,
    /// Length in seconds of each cue produced from untimed text.
    pub synthetic_duration: f64,
    /// Keep periods after initials and titles (`J.`, `U.S.`, `Dr.`) from closing a cue.
    pub abbreviation_guard: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_pause: 1.0,
            synthetic_duration: 2.0,
            abbreviation_guard: true,
        }
    }
}

impl SegmenterConfig {
    pub fn validate(&self) -> CueResult<()> {
        if !self.max_pause.is_finite() || self.max_pause < 0.0 {
            return Err(CueError::InvalidDuration {
                seconds: self.max_pause,
            });
        }
        validate_synthetic_duration(self.synthetic_duration)
    }
}

/// Where the words come from and whether they carry timing.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentSource {
    Timed(Vec<WordToken>),
    Untimed { text: String, synthetic_duration: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryPolicy {
    pub max_pause: f64,
    pub abbreviation_guard: bool,
}

impl BoundaryPolicy {
    /// Whether the cue holding `token` closes after it.
    ///
    /// `next` is the following non-blank word, or `None` at the end of input.
    pub fn is_sentence_boundary(&self, token: &WordToken, next: Option<&WordToken>) -> bool {
        let Some(next) = next else {
            return true;
        };
        if ends_sentence(&token.text, self.abbreviation_guard) {
            return true;
        }
        next.start - token.end > self.max_pause
    }
}

/// Whether the trimmed word ends with `.`, `!`, `?` or `…`.
///
/// With the guard on, a trailing period after an initial (`J.`), a dotted
/// abbreviation (`U.S.`, `e.g.`) or a title (`Dr.`) does not count.
pub fn ends_sentence(text: &str, abbreviation_guard: bool) -> bool {
    let text = text.trim();
    match text.chars().last() {
        Some('!' | '?' | '…') => true,
        Some('.') => !(abbreviation_guard && is_abbreviation(text)),
        _ => false,
    }
}

fn is_abbreviation(text: &str) -> bool {
    let Some(body) = text.strip_suffix('.') else {
        return false;
    };
    let body = body.trim_start_matches(['(', '[', '"', '\'', '“', '‘']);

    let mut chars = body.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.is_alphabetic() && c.is_uppercase();
    }

    if is_dotted_initials(body) {
        return true;
    }

    ABBREVIATIONS.contains(&body.to_lowercase().as_str())
}

// "U.S" / "e.g": letters separated by single periods.
fn is_dotted_initials(body: &str) -> bool {
    let mut count = 0;
    for part in body.split('.') {
        let mut chars = part.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_alphabetic() => count += 1,
            _ => return false,
        }
    }
    count >= 2
}

#[derive(Debug, Clone)]
pub struct Segmenter {
    config: SegmenterConfig,
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> CueResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    pub fn policy(&self) -> BoundaryPolicy {
        BoundaryPolicy {
            max_pause: self.config.max_pause,
            abbreviation_guard: self.config.abbreviation_guard,
        }
    }

    /// Untimed source using this segmenter's synthetic duration.
    pub fn untimed(&self, text: impl Into<String>) -> SegmentSource {
        SegmentSource::Untimed {
            text: text.into(),
            synthetic_duration: self.config.synthetic_duration,
        }
    }

    pub fn segment(&self, source: &SegmentSource) -> CueResult<Vec<Cue>> {
        match source {
            SegmentSource::Timed(tokens) => self.segment_timed(tokens),
            SegmentSource::Untimed {
                text,
                synthetic_duration,
            } => self.segment_untimed(text, *synthetic_duration),
        }
    }

    /// Rejects tokens with negative, non-finite, or reversed timing before
    /// any cue is built.
    pub fn segment_timed(&self, tokens: &[WordToken]) -> CueResult<Vec<Cue>> {
        validate_tokens(tokens)?;

        let words: Vec<&WordToken> = tokens.iter().filter(|t| !t.is_blank()).collect();
        let mut cues = Vec::new();
        self.fold(&words, &mut Clock::Real, &mut cues);
        Ok(cues)
    }

    /// Each line is a paragraph; a sentence never continues past a line break.
    pub fn segment_untimed(&self, text: &str, synthetic_duration: f64) -> CueResult<Vec<Cue>> {
        validate_synthetic_duration(synthetic_duration)?;

        let mut clock = Clock::Synthetic {
            at: 0.0,
            step: synthetic_duration,
        };
        let mut cues = Vec::new();
        for paragraph in text.lines() {
            let tokens: Vec<WordToken> = paragraph
                .split_whitespace()
                .map(|w| WordToken::new(w, 0.0, 0.0))
                .collect();
            let words: Vec<&WordToken> = tokens.iter().collect();
            self.fold(&words, &mut clock, &mut cues);
        }
        Ok(cues)
    }

    fn fold(&self, words: &[&WordToken], clock: &mut Clock, cues: &mut Vec<Cue>) {
        let policy = self.policy();
        let mut state = CueState::Empty;

        for (i, word) in words.iter().enumerate() {
            state.push(*word, clock);

            let next = words.get(i + 1).copied();
            if policy.is_sentence_boundary(word, next) {
                let end = clock.close(word);
                if let Some(cue) = state.emit(cues.len() + 1, end) {
                    cues.push(cue);
                }
            }
        }
    }
}

fn validate_tokens(tokens: &[WordToken]) -> CueResult<()> {
    for (index, t) in tokens.iter().enumerate() {
        let reason = if !t.start.is_finite() || !t.end.is_finite() {
            "timing is not finite".to_string()
        } else if t.start < 0.0 || t.end < 0.0 {
            format!("negative timing ({} - {})", t.start, t.end)
        } else if t.end < t.start {
            format!("end {} precedes start {}", t.end, t.start)
        } else {
            continue;
        };
        return Err(CueError::InvalidToken { index, reason });
    }
    Ok(())
}

fn validate_synthetic_duration(seconds: f64) -> CueResult<()> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(CueError::InvalidDuration { seconds });
    }
    Ok(())
}

enum Clock {
    Real,
    Synthetic { at: f64, step: f64 },
}

impl Clock {
    fn open(&self, word: &WordToken) -> f64 {
        match self {
            Clock::Real => word.start,
            Clock::Synthetic { at, .. } => *at,
        }
    }

    fn close(&mut self, word: &WordToken) -> f64 {
        match self {
            Clock::Real => word.end,
            Clock::Synthetic { at, step } => {
                *at += *step;
                *at
            }
        }
    }
}

enum CueState<'a> {
    Empty,
    Accumulating { start: f64, words: Vec<&'a str> },
}

impl<'a> CueState<'a> {
    fn push(&mut self, word: &'a WordToken, clock: &Clock) {
        let text = word.text.trim();
        match self {
            CueState::Empty => {
                *self = CueState::Accumulating {
                    start: clock.open(word),
                    words: vec![text],
                }
            }
            CueState::Accumulating { words, .. } => words.push(text),
        }
    }

    fn emit(&mut self, index: usize, end: f64) -> Option<Cue> {
        match std::mem::replace(self, CueState::Empty) {
            CueState::Empty => None,
            CueState::Accumulating { start, words } => Some(Cue {
                index,
                start,
                end,
                text: words.join(" ").trim().to_string(),
            }),
        }
    }
}
