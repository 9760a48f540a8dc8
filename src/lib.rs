//! Sumi-Spider: a bounded-depth, concurrent breadth-first web crawler
//!
//! This crate fetches pages starting from a single seed address, harvests the
//! outbound links it finds, and feeds them back into a shared FIFO frontier
//! that a fixed pool of workers drains until the depth bound is reached, the
//! frontier is exhausted, or the operator interrupts the crawl.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Sumi-Spider operations
///
/// These are the errors that abort setup or the crawl itself. Per-page
/// problems are [`CrawlError`]s and never surface here.
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Maximum depth cannot be negative, got {0}")]
    NegativeDepth(i64),

    #[error("Invalid starting address '{address}': {reason}")]
    InvalidSeed { address: String, reason: String },

    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Recoverable per-item errors
///
/// Each one costs the crawl exactly one work item (or one candidate link) and
/// is handed to a [`output::DiagnosticSink`] instead of being propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlError {
    #[error("Fetch failed for {address}: {reason}")]
    FetchFailure { address: String, reason: String },

    #[error("Invalid URL format: {candidate}")]
    MalformedCandidate { candidate: String },
}

/// Result type alias for Sumi-Spider operations
pub type Result<T> = std::result::Result<T, SpiderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{harvest, Coordinator, Fetcher, Frontier, WorkItem};
pub use state::{CrawlPhase, CrawlState, StopReason};
