//! Diagnostic sinks for recoverable crawl errors
//!
//! Every fetch failure and rejected link is reported to a [`DiagnosticSink`],
//! one event at a time. The crawl never waits on or reacts to the outcome.

use crate::CrawlError;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only destination for recoverable crawl errors
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, error: &CrawlError);
}

/// Appends one line per event to a log file
#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl ErrorLog {
    /// Opens (creating if needed) `path` for appending
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

}

impl DiagnosticSink for ErrorLog {
    fn report(&self, error: &CrawlError) {
        tracing::warn!("{}", error);

        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = write_line(&mut *file, error) {
            tracing::error!("Unable to write to {}: {}", self.path.display(), e);
        }
    }
}

/// Writes one line per event to standard error
///
/// Used when the error log file cannot be opened. Lines go straight to
/// stderr so they survive `--quiet`; each event is also mirrored as a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&self, error: &CrawlError) {
        tracing::warn!("{}", error);

        // Nowhere left to report a failed write to stderr
        let _ = write_line(&mut io::stderr().lock(), error);
    }
}

/// The single line recorded for one event
fn write_line(out: &mut impl Write, error: &CrawlError) -> io::Result<()> {
    writeln!(out, "{}", error)
}

/// Keeps every reported error in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    errors: Mutex<Vec<CrawlError>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far, in report order
    pub fn errors(&self) -> Vec<CrawlError> {
        self.errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, error: &CrawlError) {
        self.errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(error.clone());
    }
}
