//! Turn time-stamped word tokens into subtitle cues.
//!
//! [`segment`] groups words into sentence-level cues and
//! [`formats::time`] converts offsets to and from `HH:MM:SS,mmm`. Everything
//! else here reads engine output and writes subtitle files around those two.

pub mod cli;
pub mod config;
pub mod error;
pub mod formats;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod segment;

pub use error::{CueError, CueResult};
pub use formats::time::{decode, encode};
pub use model::{Cue, WordToken};
pub use segment::{BoundaryPolicy, SegmentSource, Segmenter, SegmenterConfig};
