//! Size-change signaling and cooperative stop.
//!
//! ## Purpose
//!
//! This module turns ring-buffer notifications into something a thread can
//! block on. A [`SizeSignal`] is registered on a buffer as an observer; the
//! producer waits on it for "space freed" and the receiver waits on it for
//! "threshold reached".
//!
//! ## Design notes
//!
//! * **Generation counter**: Every notification bumps a counter. A waiter reads
//!   the generation *before* inspecting the buffer and then waits for a newer
//!   one, so a notification that lands between the check and the wait is never
//!   lost.
//! * **Lock order**: The buffer lock is held while the signal lock is taken
//!   (inside the observer callback). Waiters never touch the buffer while
//!   holding the signal lock, so the order is never reversed.
//! * **One signal per participant**: Producer and receiver each own a signal,
//!   so stopping one does not wake the other.
//!
//! ## Invariants
//!
//! * The generation never decreases.
//! * Once cancelled, a signal stays cancelled and every wait returns immediately.
//!
//! ## Non-goals
//!
//! * No timeouts. A stalled counterpart blocks its peer until stopped.

// External dependencies
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

// Internal dependencies
use crate::collections::observer::SizeObserver;
use crate::primitives::errors::{HubbleError, Result};

// ============================================================================
// SizeSignal
// ============================================================================

#[derive(Debug, Default)]
struct SignalState {
    generation: u64,
    last_size: usize,
    cancelled: bool,
}

/// Blocking event counter fed by ring-buffer size notifications.
#[derive(Debug, Default)]
pub struct SizeSignal {
    state: Mutex<SignalState>,
    cond: Condvar,
}

impl SizeSignal {
    /// Create a signal at generation zero.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SignalState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current generation. Read this before checking the buffer.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Size carried by the most recent notification.
    pub fn last_size(&self) -> usize {
        self.lock().last_size
    }

    /// Block until a notification newer than `seen` arrives.
    ///
    /// Returns the new generation.
    ///
    /// # Errors
    /// Returns [`HubbleError::Interrupted`] if the signal is, or becomes, cancelled.
    pub fn wait_past(&self, seen: u64) -> Result<u64> {
        let mut state = self.lock();
        loop {
            if state.cancelled {
                return Err(HubbleError::Interrupted);
            }
            if state.generation > seen {
                return Ok(state.generation);
            }
            state = self
                .cond
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Wake every waiter with [`HubbleError::Interrupted`].
    pub fn cancel(&self) {
        self.lock().cancelled = true;
        self.cond.notify_all();
    }

    /// Returns `true` once [`SizeSignal::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }
}

impl SizeObserver for SizeSignal {
    fn size_changed(&self, size: usize) {
        {
            let mut state = self.lock();
            state.generation += 1;
            state.last_size = size;
        }
        self.cond.notify_all();
    }
}

// ============================================================================
// StopHandle
// ============================================================================

/// Cloneable handle that asks a producer or receiver to stop.
///
/// The request is observed at the participant's next wait or loop boundary.
#[derive(Debug, Clone)]
pub struct StopHandle {
    signal: Arc<SizeSignal>,
}

impl StopHandle {
    pub(crate) fn new(signal: Arc<SizeSignal>) -> Self {
        Self { signal }
    }

    /// Request a stop.
    pub fn stop(&self) {
        self.signal.cancel();
    }

    /// Returns `true` if a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.signal.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_notification_before_wait_is_not_lost() {
        let signal = SizeSignal::new();
        let seen = signal.generation();
        signal.size_changed(3);

        // The notification already happened; the wait must not block.
        assert_eq!(signal.wait_past(seen), Ok(1));
        assert_eq!(signal.last_size(), 3);
    }

    #[test]
    fn test_cancel_wakes_waiter() {
        let signal = Arc::new(SizeSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || signal.wait_past(signal.generation()))
        };

        StopHandle::new(Arc::clone(&signal)).stop();
        assert_eq!(waiter.join().unwrap(), Err(HubbleError::Interrupted));
        assert!(signal.is_cancelled());
    }
}
