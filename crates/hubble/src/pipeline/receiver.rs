//! Receiver side of the pipeline.
//!
//! ## Purpose
//!
//! A [`Receiver`] waits until the ring buffer holds at least `threshold`
//! elements, detaches exactly that many of the oldest ones in one atomic
//! `take`, hands them to a [`Processor`] and waits for the processor to finish.
//!
//! ## Design notes
//!
//! * **State machine**: `Blocked → Ready → Draining → Dispatching → Done`, or
//!   `Cancelled` from any waiting state.
//! * **Modes**: [`ReceiveMode::OneShot`] runs the machine once.
//!   [`ReceiveMode::Repeat`] and [`ReceiveMode::Continuous`] loop back to
//!   `Blocked` after each batch.
//! * **Single reader**: The threshold protocol assumes this is the only thread
//!   calling `take` on the buffer.
//!
//! ## Invariants
//!
//! * Every dispatched batch has exactly `threshold` elements.
//! * At most one batch is in flight at a time.
//!
//! ## Non-goals
//!
//! * Multiple concurrent receivers on one buffer.

// External dependencies
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

// Internal dependencies
use crate::collections::ring_buffer::RingBuffer;
use crate::pipeline::processor::Processor;
use crate::pipeline::signal::{SizeSignal, StopHandle};
use crate::primitives::errors::{HubbleError, Result};

// ============================================================================
// Modes and States
// ============================================================================

/// How many batches a receiver handles before finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiveMode {
    /// A single batch.
    #[default]
    OneShot,

    /// Exactly this many batches.
    Repeat(usize),

    /// Until stopped.
    Continuous,
}

impl ReceiveMode {
    fn wants_more(self, received: usize) -> bool {
        match self {
            ReceiveMode::OneShot => received < 1,
            ReceiveMode::Repeat(count) => received < count,
            ReceiveMode::Continuous => true,
        }
    }
}

/// Observable state of a [`Receiver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    /// Waiting for the buffer to reach the threshold.
    Blocked,
    /// Threshold reached.
    Ready,
    /// Taking the batch out of the buffer.
    Draining,
    /// Waiting for the processor to finish the batch.
    Dispatching,
    /// All requested batches were processed.
    Done,
    /// Stopped before finishing.
    Cancelled,
}

// ============================================================================
// Receiver
// ============================================================================

/// Drains fixed-size batches from a [`RingBuffer`] into a [`Processor`].
pub struct Receiver<T, P: ?Sized> {
    buffer: Arc<RingBuffer<T>>,
    processor: Arc<P>,
    threshold: usize,
    mode: ReceiveMode,
    signal: Arc<SizeSignal>,
    state: ReceiverState,
    received: usize,
}

impl<T, P> Receiver<T, P>
where
    T: Clone + Default,
    P: Processor<T> + ?Sized,
{
    /// Create a receiver and register its signal on `buffer`.
    ///
    /// # Errors
    /// Returns [`HubbleError::InvalidArgument`] unless
    /// `1 <= threshold <= buffer.capacity()`; a larger threshold could never be reached.
    pub fn new(buffer: Arc<RingBuffer<T>>, processor: Arc<P>, threshold: usize) -> Result<Self> {
        let capacity = buffer.capacity();
        if threshold == 0 || threshold > capacity {
            return Err(HubbleError::InvalidArgument(format!(
                "receiver threshold {threshold} must be between 1 and the buffer capacity {capacity}"
            )));
        }

        let signal = Arc::new(SizeSignal::new());
        buffer.register_observer(&signal);

        Ok(Self {
            buffer,
            processor,
            threshold,
            mode: ReceiveMode::OneShot,
            signal,
            state: ReceiverState::Blocked,
            received: 0,
        })
    }

    /// Set how many batches to handle.
    pub fn with_mode(mut self, mode: ReceiveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Handle that stops [`Receiver::run`] from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::new(Arc::clone(&self.signal))
    }

    /// Current state.
    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// Number of batches the processor finished.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Batch size.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    fn transition(&mut self, next: ReceiverState) {
        debug!(from = ?self.state, to = ?next, "receiver state change");
        self.state = next;
    }

    /// Run the state machine until done or stopped.
    ///
    /// Returns the number of batches processed. A stop request is not an error.
    ///
    /// # Errors
    /// Propagates a processor failure other than [`HubbleError::Interrupted`].
    pub fn run(&mut self) -> Result<usize> {
        info!(threshold = self.threshold, mode = ?self.mode, "receiver started");

        while self.mode.wants_more(self.received) {
            if self.signal.is_cancelled() {
                return Ok(self.cancel());
            }

            self.transition(ReceiverState::Blocked);
            if self.wait_for_threshold().is_err() {
                return Ok(self.cancel());
            }

            self.transition(ReceiverState::Ready);
            self.transition(ReceiverState::Draining);
            let batch = self.buffer.take(self.threshold);
            debug!(len = batch.len(), remaining = self.buffer.size(), "batch detached");

            self.transition(ReceiverState::Dispatching);
            self.processor.on_batch_received(batch);
            match self.processor.completion_signal().wait() {
                Ok(()) => self.received += 1,
                Err(HubbleError::Interrupted) => return Ok(self.cancel()),
                Err(err) => {
                    warn!(error = %err, "processor failed, receiver giving up");
                    self.transition(ReceiverState::Cancelled);
                    return Err(err);
                }
            }
        }

        self.transition(ReceiverState::Done);
        info!(batches = self.received, "receiver done");
        Ok(self.received)
    }

    fn wait_for_threshold(&self) -> Result<()> {
        loop {
            let seen = self.signal.generation();
            if self.buffer.size() >= self.threshold {
                return Ok(());
            }
            self.signal.wait_past(seen)?;
        }
    }

    fn cancel(&mut self) -> usize {
        self.transition(ReceiverState::Cancelled);
        info!(batches = self.received, "receiver stopped");
        self.received
    }
}

impl<T, P: ?Sized> Drop for Receiver<T, P> {
    fn drop(&mut self) {
        self.buffer.unregister_observer(&self.signal);
    }
}

impl<T, P: ?Sized> fmt::Debug for Receiver<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("threshold", &self.threshold)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("received", &self.received)
            .finish_non_exhaustive()
    }
}
