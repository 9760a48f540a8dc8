//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the depth bound and the monotonic stop signal shared by all workers
//! - `CrawlPhase`: the coordinator's `Running -> Draining -> Stopped` lifecycle

mod crawl_state;
mod phase;

// Re-export main types
pub use crawl_state::{CrawlState, StopReason};
pub use phase::CrawlPhase;
