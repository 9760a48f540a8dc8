//! Shared crawl state: the depth bound and the monotonic stop signal

use std::fmt;
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;

/// Why the crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The operator interrupted the crawl
    Interrupted,

    /// A worker dequeued an item at or beyond the depth bound
    DepthBoundReached,

    /// The frontier ran dry with no worker holding an item
    FrontierExhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Interrupted => "interrupted",
            Self::DepthBoundReached => "depth bound reached",
            Self::FrontierExhausted => "frontier exhausted",
        };
        write!(f, "{}", s)
    }
}

/// State shared by the coordinator and every worker
///
/// The depth bound is fixed at construction. The stop flag only ever moves
/// from "running" to "stopped"; the first caller of [`CrawlState::request_stop`]
/// decides the recorded [`StopReason`], later calls are no-ops.
#[derive(Debug)]
pub struct CrawlState {
    max_depth: u32,
    stop: CancellationToken,
    reason: OnceLock<StopReason>,
}

impl CrawlState {
    /// Creates a running crawl state with the given depth bound
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            stop: CancellationToken::new(),
            reason: OnceLock::new(),
        }
    }

    /// The configured depth bound
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Returns true if an item at `depth` must not be fetched
    pub fn exceeds_bound(&self, depth: u32) -> bool {
        depth >= self.max_depth
    }

    /// Sets the stop flag and wakes everything waiting on it
    ///
    /// Returns true if this call performed the transition.
    pub fn request_stop(&self, reason: StopReason) -> bool {
        let first = self.reason.set(reason).is_ok();
        self.stop.cancel();
        if first {
            tracing::debug!("Stop requested: {}", reason);
        }
        first
    }

    /// Returns true once the stop flag has been set
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// The reason recorded by the first stop request, if any
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.reason.get().copied()
    }

    /// Resolves once the stop flag is set
    pub async fn stopped(&self) {
        self.stop.cancelled().await
    }

    /// A token that is cancelled together with the stop flag
    pub fn token(&self) -> CancellationToken {
        self.stop.clone()
    }
}
