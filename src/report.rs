use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;

const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sink for failures the pipeline recovers from and moves past.
pub trait ErrorReporter {
    fn report(&self, err: &anyhow::Error);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, err: &anyhow::Error) {
        let chain = format!("{err:#}");
        tracing::error!(error = chain.as_str(), "operation failed");
    }
}

/// Logs through tracing and appends one line per error to a file.
#[derive(Debug, Clone)]
pub struct FileReporter {
    path: PathBuf,
}

impl FileReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, err: &anyhow::Error) -> std::io::Result<()> {
        let stamp = Local::now().format(STAMP_FORMAT);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "[{stamp}] {err:#}")
    }
}

impl ErrorReporter for FileReporter {
    fn report(&self, err: &anyhow::Error) {
        TracingReporter.report(err);
        if let Err(io) = self.append(err) {
            tracing::warn!(
                path = %self.path.display(),
                error = %io,
                "failed writing error log"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::fs;

    #[test]
    fn test_file_reporter_appends_each_error() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = FileReporter::new(dir.path().join("errors.log"));

        reporter.report(&anyhow!("first"));
        reporter.report(&anyhow!("inner").context("outer"));

        let log = fs::read_to_string(reporter.path()).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] first"));
        assert!(lines[1].ends_with("] outer: inner"));

        let stamp = lines[0]
            .strip_prefix('[')
            .and_then(|l| l.split_once(']'))
            .map(|(stamp, _)| stamp)
            .unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_file_reporter_survives_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = FileReporter::new(dir.path().join("missing").join("errors.log"));
        reporter.report(&anyhow!("lost"));
        assert!(!reporter.path().exists());
    }
}
