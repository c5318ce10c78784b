//! Work distribution queue for render workers.
//!
//! An unbounded FIFO shared by one producer (the orchestrator driving the
//! enumerator) and N consumer workers, with an explicit pending counter so
//! the producer can wait for every enqueued item, shutdown sentinels
//! included, to be acknowledged.
//!
//! Shutdown is a tagged variant ([`WorkItem::Shutdown`]) rather than an
//! `Option`, and drain is a counted barrier rather than sentinel counting:
//! `await_drain` returns only after exactly `enqueued + worker_count`
//! acknowledgements.

use crate::pyramid::RenderRequest;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// A queue item: either one tile of work or a worker shutdown signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// Render (or skip) one tile
    Tile(RenderRequest),
    /// No more work for the worker that pops this
    Shutdown,
}

struct QueueState {
    items: VecDeque<WorkItem>,
    /// Items pushed but not yet acknowledged via `mark_done`.
    pending: usize,
}

/// Unbounded single-producer / multi-consumer FIFO with a completion barrier.
///
/// `push` never blocks. `pop` blocks the calling worker until an item is
/// available. Every popped item must be acknowledged with exactly one
/// `mark_done` call; `await_drain` blocks until the pending count reaches
/// zero.
pub struct WorkQueue {
    state: Mutex<QueueState>,
    item_available: Condvar,
    drained: Condvar,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                pending: 0,
            }),
            item_available: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    /// Enqueue an item. Never blocks; the queue has no capacity bound.
    pub fn push(&self, item: WorkItem) {
        let mut state = self.state.lock().unwrap();
        state.items.push_back(item);
        state.pending += 1;
        drop(state);
        self.item_available.notify_one();
    }

    /// Dequeue the next item, blocking until one is available.
    pub fn pop(&self) -> WorkItem {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(item) = state.items.pop_front() {
                return item;
            }
            state = self.item_available.wait(state).unwrap();
        }
    }

    /// Acknowledge one previously popped item.
    ///
    /// Workers call this once per pop, regardless of whether the tile was
    /// rendered, skipped, or failed.
    pub fn mark_done(&self) {
        let mut state = self.state.lock().unwrap();
        debug_assert!(state.pending > 0, "mark_done without matching push");
        state.pending = state.pending.saturating_sub(1);
        if state.pending == 0 {
            self.drained.notify_all();
        }
    }

    /// Block until every pushed item has been acknowledged.
    pub fn await_drain(&self) {
        let mut state = self.state.lock().unwrap();
        while state.pending > 0 {
            state = self.drained.wait(state).unwrap();
        }
    }

    /// Items pushed but not yet acknowledged.
    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().pending
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}
