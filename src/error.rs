use thiserror::Error;

/// Failures raised by the timestamp codec and the cue segmenter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CueError {
    /// Seconds value is negative, NaN, or infinite.
    #[error("invalid duration: {seconds} (must be finite and non-negative)")]
    InvalidDuration { seconds: f64 },

    /// Text does not match `HH:MM:SS,mmm`.
    #[error("malformed timestamp '{input}': {reason}")]
    MalformedTimestamp { input: String, reason: &'static str },

    /// Word token with unusable timing.
    #[error("invalid token #{index}: {reason}")]
    InvalidToken { index: usize, reason: String },
}

pub type CueResult<T> = Result<T, CueError>;
