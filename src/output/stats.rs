//! Crawl summary statistics
//!
//! Workers count what they did locally and hand the counts back when they
//! exit; the coordinator folds them into a [`CrawlSummary`].

use crate::state::StopReason;
use chrono::{DateTime, Utc};
use std::ops::AddAssign;
use std::time::Duration;

/// What a single worker did before exiting
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    /// Pages fetched successfully
    pub pages_fetched: u64,

    /// Fetches that failed
    pub fetch_failures: u64,

    /// Harvested candidates dropped for lacking an accepted scheme
    pub malformed_candidates: u64,

    /// Work items pushed back to the frontier
    pub items_enqueued: u64,
}

impl AddAssign for WorkerReport {
    fn add_assign(&mut self, other: Self) {
        self.pages_fetched += other.pages_fetched;
        self.fetch_failures += other.fetch_failures;
        self.malformed_candidates += other.malformed_candidates;
        self.items_enqueued += other.items_enqueued;
    }
}

/// Outcome of a complete crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// The seed address
    pub seed: String,

    /// The configured depth bound
    pub max_depth: u32,

    /// Size of the worker pool
    pub workers: usize,

    /// Why the crawl stopped
    pub stop_reason: StopReason,

    /// Totals across all workers
    pub totals: WorkerReport,

    /// Items still queued when the crawl stopped
    pub items_discarded: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlSummary {
    /// Wall-clock duration of the crawl
    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// Total fetch attempts (successful or not)
    pub fn fetch_attempts(&self) -> u64 {
        self.totals.pages_fetched + self.totals.fetch_failures
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Crawl:");
    println!("  Seed: {}", summary.seed);
    println!("  Max depth: {}", summary.max_depth);
    println!("  Workers: {}", summary.workers);
    println!("  Stopped: {}", summary.stop_reason);
    println!(
        "  Started: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Duration: {:.2}s", summary.duration().as_secs_f64());
    println!();

    println!("Pages:");
    println!("  Fetched: {}", summary.totals.pages_fetched);
    println!("  Fetch failures: {}", summary.totals.fetch_failures);
    println!("  Links enqueued: {}", summary.totals.items_enqueued);
    println!(
        "  Malformed links: {}",
        summary.totals.malformed_candidates
    );
    println!("  Discarded at shutdown: {}", summary.items_discarded);
    println!();

    let attempts = summary.fetch_attempts();
    let success_rate = if attempts > 0 {
        (summary.totals.pages_fetched as f64 / attempts as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% ({} / {} fetches)",
        success_rate, summary.totals.pages_fetched, attempts
    );
}
