//! Crawler module for the concurrent crawl engine
//!
//! This module contains the core crawling logic, including:
//! - The shared FIFO frontier of (address, depth) work items
//! - Textual link harvesting
//! - HTTP fetching behind the `Fetcher` boundary
//! - The worker loop and the coordinator that runs the worker pool

mod coordinator;
mod fetcher;
mod frontier;
mod harvester;
mod worker;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher, HttpFetcher};
pub use frontier::{Frontier, WorkItem};
pub use harvester::{harvest, Harvest};
pub use worker::Worker;

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::SpiderError;
use url::Url;

/// Checks a depth bound supplied from outside the program
///
/// # Returns
///
/// * `Ok(u32)` - The depth bound
/// * `Err(SpiderError::NegativeDepth)` - The value was negative
pub fn validate_max_depth(max_depth: i64) -> Result<u32, SpiderError> {
    if max_depth < 0 {
        return Err(SpiderError::NegativeDepth(max_depth));
    }
    // Anything beyond u32 is unreachable in practice; clamp rather than fail
    Ok(u32::try_from(max_depth).unwrap_or(u32::MAX))
}

/// Checks that the starting address is an absolute http(s) URL
pub fn validate_seed(address: &str) -> Result<Url, SpiderError> {
    let url = Url::parse(address).map_err(|e| SpiderError::InvalidSeed {
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SpiderError::InvalidSeed {
            address: address.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the depth bound and the starting address
/// 2. Build the HTTP fetcher and open the error log
/// 3. Run the worker pool until the depth bound, frontier exhaustion, or Ctrl-C
///
/// Nothing is fetched if validation fails.
///
/// # Example
///
/// ```no_run
/// use sumi_spider::config::Config;
/// use sumi_spider::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = crawl(&Config::default(), "https://example.com/", 2).await?;
/// println!("Fetched {} pages", summary.totals.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: &Config,
    seed: &str,
    max_depth: i64,
) -> Result<CrawlSummary, SpiderError> {
    let max_depth = validate_max_depth(max_depth)?;
    validate_seed(seed)?;

    let mut coordinator = Coordinator::from_config(config, seed, max_depth)?;
    coordinator.run().await
}
