//! The shared crawl frontier
//!
//! A FIFO queue of [`WorkItem`]s shared by every worker. Besides the queue
//! itself the frontier tracks how many popped items are still being worked
//! on, which lets it tell "empty for now" apart from "empty for good":
//!
//! - `pop` on an empty queue parks the caller until an item is pushed, the
//!   crawl is stopped, or the frontier is exhausted.
//! - Once the queue is empty and no worker holds an item, nothing can ever be
//!   pushed again. The frontier marks itself exhausted and releases every
//!   parked worker at once.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// A unit of work: an address and the number of link hops from the seed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    /// The address to fetch
    pub address: String,

    /// Link hops from the seed (the seed itself is depth 0)
    pub depth: u32,
}

impl WorkItem {
    pub fn new(address: impl Into<String>, depth: u32) -> Self {
        Self {
            address: address.into(),
            depth,
        }
    }
}

#[derive(Debug, Default)]
struct Queue {
    items: VecDeque<WorkItem>,
    in_flight: usize,
}

/// Concurrent FIFO work queue with stop and exhaustion wakeups
#[derive(Debug)]
pub struct Frontier {
    queue: Mutex<Queue>,
    available: Notify,
    exhausted: CancellationToken,
    stop: CancellationToken,
}

impl Frontier {
    /// Creates an empty frontier whose blocking `pop` is released by `stop`
    pub fn new(stop: CancellationToken) -> Self {
        Self {
            queue: Mutex::new(Queue::default()),
            available: Notify::new(),
            exhausted: CancellationToken::new(),
            stop,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        // A panicking worker cannot leave the queue half-updated
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Appends an item to the tail and wakes one parked `pop`
    pub fn push(&self, item: WorkItem) {
        self.lock().items.push_back(item);
        self.available.notify_one();
    }

    /// Removes and returns the head of the queue
    ///
    /// Parks while the queue is empty but some worker still holds an item.
    /// Returns `None` once the crawl is stopped or the frontier is exhausted.
    ///
    /// Every `Some` must be matched by exactly one [`Frontier::complete`] once
    /// the caller has finished with the item (including pushing its links).
    pub async fn pop(&self) -> Option<WorkItem> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            // Register before checking the queue so a concurrent push is never missed
            notified.as_mut().enable();

            {
                let mut queue = self.lock();
                if self.stop.is_cancelled() {
                    return None;
                }
                if let Some(item) = queue.items.pop_front() {
                    queue.in_flight += 1;
                    return Some(item);
                }
                if queue.in_flight == 0 {
                    self.exhausted.cancel();
                    return None;
                }
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = self.stop.cancelled() => return None,
                _ = self.exhausted.cancelled() => return None,
            }
        }
    }

    /// Marks one previously popped item as finished
    pub fn complete(&self) {
        let mut queue = self.lock();
        queue.in_flight = queue.in_flight.saturating_sub(1);
        if queue.in_flight == 0 && queue.items.is_empty() {
            self.exhausted.cancel();
        }
    }

    /// Discards every queued item, returning how many were dropped
    pub fn drain(&self) -> usize {
        let mut queue = self.lock();
        let dropped = queue.items.len();
        queue.items.clear();
        dropped
    }

    /// Number of queued items (not counting items held by workers)
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Number of items popped but not yet completed
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Returns true once no more work can appear
    pub fn is_exhausted(&self) -> bool {
        self.exhausted.is_cancelled()
    }

    /// Resolves once the frontier is exhausted
    pub async fn exhausted(&self) {
        self.exhausted.cancelled().await
    }
}
