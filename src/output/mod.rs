//! Output module for crawl diagnostics and summaries
//!
//! This module handles:
//! - Reporting recoverable errors to an append-only diagnostic sink
//! - Aggregating and printing crawl statistics

pub mod diagnostics;
pub mod stats;

pub use diagnostics::{DiagnosticSink, ErrorLog, MemorySink, StderrSink};
pub use stats::{print_summary, CrawlSummary, WorkerReport};
