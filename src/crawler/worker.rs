//! Crawl worker
//!
//! A worker repeatedly takes the next item from the frontier, fetches it,
//! harvests its links and pushes them back, until the crawl is stopped or the
//! frontier has nothing left to give.

use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::harvester::harvest;
use crate::output::{DiagnosticSink, WorkerReport};
use crate::state::{CrawlState, StopReason};
use crate::CrawlError;
use std::sync::Arc;

/// Marks the popped item finished on every exit path
struct InFlight<'a>(&'a Frontier);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.complete();
    }
}

/// One member of the worker pool
pub struct Worker {
    id: usize,
    frontier: Arc<Frontier>,
    state: Arc<CrawlState>,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Worker {
    pub fn new(
        id: usize,
        frontier: Arc<Frontier>,
        state: Arc<CrawlState>,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            id,
            frontier,
            state,
            fetcher,
            sink,
        }
    }

    /// Runs the worker loop to completion
    ///
    /// Per iteration:
    /// 1. Exit if the stop flag is set
    /// 2. Pop the next item; exit if the frontier is stopped or exhausted
    /// 3. If the item is at or past the depth bound, set the stop flag and exit
    ///    without fetching it
    /// 4. Fetch, harvest, and push every accepted link back to the frontier
    pub async fn run(self) -> WorkerReport {
        let mut report = WorkerReport::default();
        tracing::debug!(worker = self.id, "Worker started");

        loop {
            if self.state.is_stopped() {
                break;
            }

            let Some(item) = self.frontier.pop().await else {
                break;
            };
            let _in_flight = InFlight(&self.frontier);

            if self.state.exceeds_bound(item.depth) {
                if self.state.request_stop(StopReason::DepthBoundReached) {
                    tracing::info!(
                        "Maximum depth {} reached at {}",
                        self.state.max_depth(),
                        item.address
                    );
                }
                break;
            }

            // The flag may have been set while this worker was parked in pop
            if self.state.is_stopped() {
                break;
            }

            match self.fetcher.fetch(&item.address).await {
                FetchResult::Success { body, .. } => {
                    report.pages_fetched += 1;
                    tracing::info!("Fetched URL[{}]: {}", item.depth, item.address);

                    let harvest = harvest(&body, item.depth);
                    for rejected in &harvest.rejected {
                        report.malformed_candidates += 1;
                        self.sink.report(rejected);
                    }

                    report.items_enqueued += harvest.items.len() as u64;
                    for link in harvest.items {
                        self.frontier.push(link);
                    }
                }
                failure => {
                    report.fetch_failures += 1;
                    self.sink.report(&CrawlError::FetchFailure {
                        address: item.address.clone(),
                        reason: failure.failure_reason().unwrap_or_default(),
                    });
                }
            }
        }

        tracing::debug!(worker = self.id, ?report, "Worker exited");
        report
    }
}
