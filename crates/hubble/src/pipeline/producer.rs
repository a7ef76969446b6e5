//! Producer side of the pipeline.
//!
//! ## Purpose
//!
//! A [`Producer`] pulls values from a [`ValueSource`] and appends them to a
//! shared ring buffer. When the buffer is full it parks on its own
//! [`SizeSignal`] until the receiver frees space, then retries the same value.
//!
//! ## Design notes
//!
//! * **No value is dropped**: A rejected value is handed back by
//!   [`RingBuffer::try_add`] and retried after the wait.
//! * **Cooperative stop**: The loop exits at the next wait or between values
//!   once its [`StopHandle`] fires. Stopping is not an error.
//! * **Optional limit**: A production limit makes runs deterministic.
//!
//! ## Invariants
//!
//! * Values reach the buffer in the order the source yields them.

// External dependencies
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

// Internal dependencies
use crate::collections::ring_buffer::RingBuffer;
use crate::pipeline::signal::{SizeSignal, StopHandle};

// ============================================================================
// Value Sources
// ============================================================================

/// Source of values for a [`Producer`].
pub trait ValueSource<T>: Send {
    /// Produce the next value.
    fn next_value(&mut self) -> T;
}

impl<T, F> ValueSource<T> for F
where
    F: FnMut() -> T + Send,
{
    fn next_value(&mut self) -> T {
        self()
    }
}

/// Uniformly random `i32` values over the full range.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Source seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible source.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueSource<i32> for RandomSource {
    fn next_value(&mut self) -> i32 {
        self.rng.random()
    }
}

// ============================================================================
// Producer
// ============================================================================

/// Feeds a [`RingBuffer`] from a [`ValueSource`], blocking on backpressure.
pub struct Producer<T, S> {
    buffer: Arc<RingBuffer<T>>,
    source: S,
    signal: Arc<SizeSignal>,
    limit: Option<usize>,
    produced: usize,
}

impl<T, S> Producer<T, S>
where
    T: Clone + Default,
    S: ValueSource<T>,
{
    /// Create a producer and register its signal on `buffer`.
    pub fn new(buffer: Arc<RingBuffer<T>>, source: S) -> Self {
        let signal = Arc::new(SizeSignal::new());
        buffer.register_observer(&signal);
        Self {
            buffer,
            source,
            signal,
            limit: None,
            produced: 0,
        }
    }

    /// Stop after `limit` values have been added.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Handle that stops [`Producer::run`] from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::new(Arc::clone(&self.signal))
    }

    /// Number of values added so far.
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Produce until stopped or until the limit is reached.
    ///
    /// Returns the total number of values added by this producer.
    pub fn run(&mut self) -> usize {
        info!(limit = ?self.limit, "producer started");

        loop {
            if matches!(self.limit, Some(limit) if self.produced >= limit) {
                info!(produced = self.produced, "producer reached its limit");
                return self.produced;
            }
            if self.signal.is_cancelled() {
                break;
            }

            let value = self.source.next_value();
            if !self.offer(value) {
                break;
            }
            self.produced += 1;
        }

        info!(produced = self.produced, "producer stopped");
        self.produced
    }

    /// Add `value`, waiting for space as often as needed. Returns `false` if
    /// stopped first.
    fn offer(&mut self, mut value: T) -> bool {
        loop {
            let seen = self.signal.generation();
            match self.buffer.try_add(value) {
                Ok(()) => return true,
                Err(rejected) => {
                    debug!(produced = self.produced, "buffer full, waiting for space");
                    if self.signal.wait_past(seen).is_err() {
                        return false;
                    }
                    value = rejected;
                }
            }
        }
    }
}

impl<T, S> Drop for Producer<T, S> {
    fn drop(&mut self) {
        self.buffer.unregister_observer(&self.signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_limit_fills_in_order() {
        let buffer = Arc::new(RingBuffer::<i32>::new(8).unwrap());
        let mut next = 0;
        let mut producer = Producer::new(Arc::clone(&buffer), move || {
            next += 1;
            next
        })
        .with_limit(5);

        assert_eq!(producer.run(), 5);
        assert_eq!(buffer.to_vec(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_blocks_when_full_until_space_frees() {
        let buffer = Arc::new(RingBuffer::<i32>::new(2).unwrap());
        let mut next = 0;
        let mut producer = Producer::new(Arc::clone(&buffer), move || {
            next += 1;
            next
        })
        .with_limit(4);

        let handle = thread::spawn(move || producer.run());

        let mut seen = Vec::new();
        while seen.len() < 4 {
            seen.extend(buffer.take(1));
            thread::yield_now();
        }

        assert_eq!(handle.join().unwrap(), 4);
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_stop_while_blocked() {
        let buffer = Arc::new(RingBuffer::<i32>::new(1).unwrap());
        let mut producer = Producer::new(Arc::clone(&buffer), || 7);
        let stop = producer.stop_handle();

        let handle = thread::spawn(move || producer.run());
        while !buffer.is_full() {
            thread::yield_now();
        }
        stop.stop();

        assert_eq!(handle.join().unwrap(), 1);
        assert!(stop.is_stopped());
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let mut a = RandomSource::seeded(42);
        let mut b = RandomSource::seeded(42);
        let xs: Vec<i32> = (0..8).map(|_| a.next_value()).collect();
        let ys: Vec<i32> = (0..8).map(|_| b.next_value()).collect();
        assert_eq!(xs, ys);
    }
}
