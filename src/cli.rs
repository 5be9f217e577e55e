use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "subcue")]
#[command(about = "Segment word timestamps or plain text into SRT, TXT, or JSON subtitle cues.")]
pub struct Args {
    /// Path to config TOML (defaults to ./config.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build cues from word timestamps, plain text, or an existing SRT file
    Segment(SegmentCmd),
    /// Print a seconds offset as HH:MM:SS,mmm
    Encode {
        #[arg(allow_negative_numbers = true)]
        seconds: f64,
    },
    /// Print an HH:MM:SS,mmm timestamp as seconds
    Decode { timestamp: String },
    /// Print the effective default config as TOML and exit
    PrintDefaultConfig,
}

#[derive(Debug, Clone, Parser)]
pub struct SegmentCmd {
    /// Input file paths, or '-' for stdin
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Output file path (single input only)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Target format
    #[arg(long, value_enum, default_value_t = Format::Srt)]
    pub to: Format,

    /// Force input kind (otherwise inferred from extension or content)
    #[arg(long, value_enum)]
    pub from: Option<InputFormat>,

    /// Write to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Allow overwriting output files
    #[arg(long)]
    pub overwrite: bool,

    /// Close a cue after this many seconds of silence
    #[arg(long)]
    pub max_pause: Option<f64>,

    /// Seconds given to each sentence of untimed text
    #[arg(long)]
    pub synthetic_duration: Option<f64>,

    /// Let a period after initials or titles end a cue
    #[arg(long)]
    pub no_abbreviation_guard: bool,

    /// Append failures to this file in addition to the log
    #[arg(long)]
    pub error_log: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Format {
    Srt,
    Txt,
    Json,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Srt => "srt",
            Format::Txt => "txt",
            Format::Json => "json",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum InputFormat {
    /// JSON word list with start/end seconds
    Words,
    /// Plain text without timing
    Text,
    /// Existing SubRip file
    Srt,
}
