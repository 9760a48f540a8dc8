/// Coordinator lifecycle phases
///
/// A crawl only ever moves forward: `Running -> Draining -> Stopped`.
use std::fmt;

/// Represents the current phase of the crawl lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Workers are draining and expanding the frontier
    Running,

    /// A termination condition was observed; workers are being joined
    Draining,

    /// Every worker has exited and the frontier has been discarded
    Stopped,
}

impl CrawlPhase {
    /// Returns true if `self -> next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Running, Self::Draining) | (Self::Draining, Self::Stopped)
        )
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}
