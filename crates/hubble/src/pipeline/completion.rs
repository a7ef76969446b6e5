//! One-shot completion cell.
//!
//! A [`Completion`] is handed out by a processor for each batch it accepts.
//! The worker completes it exactly once; any number of threads may wait on it.
//! Clones share the same cell.

// External dependencies
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

// Internal dependencies
use crate::primitives::errors::Result;

#[derive(Debug, Default)]
struct Cell {
    result: Mutex<Option<Result<()>>>,
    cond: Condvar,
}

/// Shared, write-once result of processing one batch.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    cell: Arc<Cell>,
}

impl Completion {
    /// Create a pending completion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a completion that is already resolved with `result`.
    pub fn resolved(result: Result<()>) -> Self {
        let completion = Self::new();
        completion.complete(result);
        completion
    }

    fn lock(&self) -> MutexGuard<'_, Option<Result<()>>> {
        self.cell
            .result
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resolve the completion. Returns `false` if it was already resolved,
    /// in which case `result` is discarded.
    pub fn complete(&self, result: Result<()>) -> bool {
        let mut slot = self.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(result);
        drop(slot);

        self.cell.cond.notify_all();
        true
    }

    /// Returns `true` once resolved.
    pub fn is_complete(&self) -> bool {
        self.lock().is_some()
    }

    /// The result, if already resolved.
    pub fn try_result(&self) -> Option<Result<()>> {
        self.lock().clone()
    }

    /// Block until resolved and return the result.
    pub fn wait(&self) -> Result<()> {
        let mut slot = self.lock();
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            slot = self
                .cell
                .cond
                .wait(slot)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }
}
