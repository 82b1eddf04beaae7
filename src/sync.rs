//! Count-down synchronization shared by collection tasks.

use log::warn;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// A wait-group style counter that wakes waiters once it reaches zero
///
/// Each unit of work calls [`done`](Self::done) exactly once. Any number of
/// tasks may [`wait`](Self::wait); they all resume when the last unit
/// finishes. A counter created with zero units is already complete.
#[derive(Debug)]
pub struct CompletionCounter {
    remaining: AtomicUsize,
    notify: Notify,
}

impl CompletionCounter {
    /// Create a counter expecting `count` completions
    pub fn new(count: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(count),
            notify: Notify::new(),
        }
    }

    /// Mark one unit of work as finished
    pub fn done(&self) {
        let previous = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        match previous {
            Ok(1) => self.notify.notify_waiters(),
            Ok(_) => {}
            Err(_) => warn!("Completion counter marked done more times than it was sized for"),
        }
    }

    /// Number of units still outstanding
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Wait until every unit has finished
    pub async fn wait(&self) {
        loop {
            // Register interest before checking so a concurrent final `done`
            // cannot slip between the check and the await.
            let notified = self.notify.notified();
            if self.remaining() == 0 {
                return;
            }
            notified.await;
        }
    }
}
