use serde::{Deserialize, Serialize};

/// One recognized word with its offsets in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordToken {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl WordToken {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub cues: Vec<Cue>,
}

impl Transcript {
    pub fn new(cues: Vec<Cue>) -> Self {
        Self { cues }
    }

    pub fn duration(&self) -> f64 {
        self.cues.last().map(|c| c.end).unwrap_or(0.0).max(0.0)
    }
}
