//! Crawler coordinator - crawl lifecycle orchestration
//!
//! The coordinator owns the frontier and the shared crawl state. It:
//! - Seeds the frontier with the starting address at depth 0
//! - Launches the worker pool once
//! - Waits for a termination condition (interrupt, depth bound, exhaustion)
//! - Stops and joins every worker, then discards what is left in the frontier

use crate::config::Config;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::{Frontier, WorkItem};
use crate::crawler::worker::Worker;
use crate::output::{CrawlSummary, DiagnosticSink, ErrorLog, StderrSink, WorkerReport};
use crate::state::{CrawlPhase, CrawlState, StopReason};
use crate::SpiderError;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;

/// Main crawler coordinator structure
pub struct Coordinator {
    seed: String,
    workers: usize,
    state: Arc<CrawlState>,
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn DiagnosticSink>,
    phase: CrawlPhase,
}

impl Coordinator {
    /// Creates a coordinator with explicit collaborators
    ///
    /// # Arguments
    ///
    /// * `seed` - The starting address
    /// * `max_depth` - Items at this depth or deeper are never fetched
    /// * `workers` - Size of the worker pool (at least one worker is always launched)
    /// * `fetcher` - Retrieves page content
    /// * `sink` - Receives fetch failures and rejected links
    pub fn new(
        seed: impl Into<String>,
        max_depth: u32,
        workers: usize,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let state = Arc::new(CrawlState::new(max_depth));
        let frontier = Arc::new(Frontier::new(state.token()));

        Self {
            seed: seed.into(),
            workers: workers.max(1),
            state,
            frontier,
            fetcher,
            sink,
            phase: CrawlPhase::Running,
        }
    }

    /// Creates a coordinator using the HTTP fetcher and the configured error log
    ///
    /// If the error log cannot be opened, diagnostics are written to stderr instead.
    pub fn from_config(
        config: &Config,
        seed: impl Into<String>,
        max_depth: u32,
    ) -> Result<Self, SpiderError> {
        let fetcher = HttpFetcher::new(&config.user_agent, &config.crawler)?;

        let sink: Arc<dyn DiagnosticSink> = match ErrorLog::open(&config.output.error_log_path) {
            Ok(log) => Arc::new(log),
            Err(e) => {
                tracing::warn!(
                    "Unable to open error log {}: {}; reporting to stderr instead",
                    config.output.error_log_path,
                    e
                );
                Arc::new(StderrSink)
            }
        };

        Ok(Self::new(
            seed,
            max_depth,
            config.crawler.workers as usize,
            Arc::new(fetcher),
            sink,
        ))
    }

    /// The shared crawl state (depth bound and stop flag)
    pub fn state(&self) -> Arc<CrawlState> {
        self.state.clone()
    }

    /// The shared frontier
    pub fn frontier(&self) -> Arc<Frontier> {
        self.frontier.clone()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    fn advance(&mut self, next: CrawlPhase) -> Result<(), SpiderError> {
        if !self.phase.can_transition_to(next) {
            return Err(SpiderError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Crawl phase: {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Runs the crawl until it finishes or Ctrl-C is pressed
    pub async fn run(&mut self) -> Result<CrawlSummary, SpiderError> {
        self.run_until(interrupt_signal()).await
    }

    /// Runs the crawl until it finishes or `shutdown` resolves
    ///
    /// A coordinator runs exactly once; calling this again after the crawl has
    /// stopped fails with [`SpiderError::InvalidTransition`].
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<CrawlSummary, SpiderError>
    where
        F: Future<Output = ()>,
    {
        if self.phase != CrawlPhase::Running {
            return Err(SpiderError::InvalidTransition {
                from: self.phase,
                to: CrawlPhase::Running,
            });
        }

        let started_at = Utc::now();
        tracing::info!(
            "Starting crawl of {} (max depth {}, {} workers)",
            self.seed,
            self.state.max_depth(),
            self.workers
        );

        self.frontier.push(WorkItem::new(self.seed.clone(), 0));

        let handles: Vec<_> = (0..self.workers)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    self.frontier.clone(),
                    self.state.clone(),
                    self.fetcher.clone(),
                    self.sink.clone(),
                );
                tokio::spawn(worker.run())
            })
            .collect();

        tokio::pin!(shutdown);
        tokio::select! {
            _ = &mut shutdown => {
                if self.state.request_stop(StopReason::Interrupted) {
                    tracing::info!("Interrupt received, stopping crawl");
                }
            }
            _ = self.state.stopped() => {}
            _ = self.frontier.exhausted() => {
                if self.state.request_stop(StopReason::FrontierExhausted) {
                    tracing::info!("Frontier exhausted, stopping crawl");
                }
            }
        }

        self.advance(CrawlPhase::Draining)?;

        let mut totals = WorkerReport::default();
        let mut join_error = None;
        for handle in handles {
            match handle.await {
                Ok(report) => totals += report,
                Err(e) => {
                    tracing::error!("Worker task failed: {}", e);
                    if join_error.is_none() {
                        join_error = Some(e);
                    }
                }
            }
        }

        let items_discarded = self.frontier.drain();
        if items_discarded > 0 {
            tracing::debug!("Discarded {} unprocessed items", items_discarded);
        }

        self.advance(CrawlPhase::Stopped)?;

        if let Some(e) = join_error {
            return Err(e.into());
        }

        // Every path above sets the flag, so a reason is always recorded
        let stop_reason = self
            .state
            .stop_reason()
            .unwrap_or(StopReason::FrontierExhausted);

        let summary = CrawlSummary {
            seed: self.seed.clone(),
            max_depth: self.state.max_depth(),
            workers: self.workers,
            stop_reason,
            totals,
            items_discarded,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Crawl stopped ({}): {} pages fetched, {} failures in {:?}",
            summary.stop_reason,
            summary.totals.pages_fetched,
            summary.totals.fetch_failures,
            summary.duration()
        );

        Ok(summary)
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Unable to listen for interrupt signal: {}", e);
        std::future::pending::<()>().await;
    }
}
