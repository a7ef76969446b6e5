//! Batch processors.
//!
//! ## Purpose
//!
//! This module defines the [`Processor`] capability a receiver dispatches to,
//! and [`SortingProcessor`], which sorts each batch off the receiver thread and
//! then applies a caller-supplied transform.
//!
//! ## Design notes
//!
//! * **Off-thread**: Each batch is processed on its own named OS thread; the
//!   receiver only waits on the batch's [`Completion`].
//! * **Pluggable sort**: The sort runs through a [`SortPassFn`], so a parallel
//!   pass can be injected without touching this module.
//! * **Always completes**: Success, error, cancellation and even a panicking
//!   transform all resolve the completion, so a waiting receiver never hangs.
//!
//! ## Key concepts
//!
//! * **Sort threshold**: Clamped to the batch length, so any batch of two or
//!   more elements can be sorted with the configured cutoff.
//! * **Outputs**: Transform results are collected in the order batches finish.
//!
//! ## Invariants
//!
//! * Every batch passed to `on_batch_received` resolves exactly one completion.
//!
//! ## Non-goals
//!
//! * Encoding or uploading transform results.

// External dependencies
use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, info, warn};

// Internal dependencies
use crate::algorithms::merge_sort::{sort_pass_sequential, SortPassFn};
use crate::collections::ring_buffer::Batch;
use crate::pipeline::completion::Completion;
use crate::primitives::errors::{HubbleError, Result};

// ============================================================================
// Processor Trait
// ============================================================================

/// Consumer of batches detached from a ring buffer.
pub trait Processor<T>: Send + Sync {
    /// Accept a batch. Must return promptly; the work happens elsewhere.
    fn on_batch_received(&self, batch: Batch<T>);

    /// Completion of the most recently received batch.
    ///
    /// Resolves immediately with `Ok(())` if no batch was ever received.
    fn completion_signal(&self) -> Completion;
}

// ============================================================================
// SortingProcessor
// ============================================================================

type Transform<T, R> = dyn Fn(&[T]) -> R + Send + Sync;

/// Sorts each batch on a worker thread, then maps it with a transform.
pub struct SortingProcessor<T, R> {
    sort_threshold: usize,
    sort_pass: SortPassFn<T>,
    transform: Arc<Transform<T, R>>,
    outputs: Arc<Mutex<Vec<R>>>,
    current: Mutex<Completion>,
    cancelled: Arc<AtomicBool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    dispatched: AtomicUsize,
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<T, R> SortingProcessor<T, R>
where
    T: Ord + Clone + Send + 'static,
    R: Send + 'static,
{
    /// Create a processor that sorts with cutoff `sort_threshold` and then
    /// applies `transform` to the sorted batch.
    ///
    /// # Errors
    /// Returns [`HubbleError::InvalidArgument`] if `sort_threshold < 2`.
    pub fn new<F>(sort_threshold: usize, transform: F) -> Result<Self>
    where
        F: Fn(&[T]) -> R + Send + Sync + 'static,
    {
        if sort_threshold < 2 {
            return Err(HubbleError::InvalidArgument(format!(
                "sort threshold must be at least 2 (got {sort_threshold})"
            )));
        }

        Ok(Self {
            sort_threshold,
            sort_pass: sort_pass_sequential::<T>,
            transform: Arc::new(transform),
            outputs: Arc::new(Mutex::new(Vec::new())),
            current: Mutex::new(Completion::resolved(Ok(()))),
            cancelled: Arc::new(AtomicBool::new(false)),
            workers: Mutex::new(Vec::new()),
            dispatched: AtomicUsize::new(0),
        })
    }

    /// Replace the sequential sort pass.
    pub fn with_sort_pass(mut self, sort_pass: SortPassFn<T>) -> Self {
        self.sort_pass = sort_pass;
        self
    }

    /// Configured sort cutoff.
    pub fn sort_threshold(&self) -> usize {
        self.sort_threshold
    }

    /// Number of batches received so far.
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// Abandon pending and future work.
    ///
    /// The current completion resolves with [`HubbleError::Interrupted`] unless
    /// it already finished. Batches received afterwards resolve the same way.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if lock(&self.current).complete(Err(HubbleError::Interrupted)) {
            info!("processor cancelled with a batch in flight");
        }
    }

    /// Returns `true` once [`SortingProcessor::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Number of worker threads not yet joined.
    pub fn live_workers(&self) -> usize {
        lock(&self.workers).len()
    }

    /// Wait for every worker thread spawned so far to exit.
    pub fn join(&self) {
        let workers = mem::take(&mut *lock(&self.workers));
        for worker in workers {
            if worker.join().is_err() {
                warn!("processor worker panicked");
            }
        }
    }

    /// Join workers that already exited.
    fn reap_finished(&self) {
        let mut workers = lock(&self.workers);
        let (finished, running): (Vec<_>, Vec<_>) =
            mem::take(&mut *workers).into_iter().partition(JoinHandle::is_finished);
        *workers = running;
        drop(workers);

        for worker in finished {
            if worker.join().is_err() {
                warn!("processor worker panicked");
            }
        }
    }

    /// Drain the transform results collected so far.
    pub fn take_outputs(&self) -> Vec<R> {
        mem::take(&mut *lock(&self.outputs))
    }
}

/// Resolves the completion if the worker unwinds before doing so itself.
struct CompleteOnDrop(Completion);

impl Drop for CompleteOnDrop {
    fn drop(&mut self) {
        self.0.complete(Err(HubbleError::ProcessorFailed(
            "worker exited without completing".into(),
        )));
    }
}

fn sort_and_transform<T, R>(
    mut items: Vec<T>,
    sort_threshold: usize,
    sort_pass: SortPassFn<T>,
    transform: &Transform<T, R>,
) -> Result<R> {
    let len = items.len();
    if len >= 2 {
        sort_pass(&mut items, sort_threshold.min(len))?;
    }
    Ok(transform(&items))
}

impl<T, R> Processor<T> for SortingProcessor<T, R>
where
    T: Ord + Clone + Send + 'static,
    R: Send + 'static,
{
    fn on_batch_received(&self, batch: Batch<T>) {
        self.reap_finished();
        let index = self.dispatched.fetch_add(1, Ordering::SeqCst);
        let completion = Completion::new();
        *lock(&self.current) = completion.clone();

        if self.is_cancelled() {
            completion.complete(Err(HubbleError::Interrupted));
            return;
        }

        let sort_threshold = self.sort_threshold;
        let sort_pass = self.sort_pass;
        let transform = Arc::clone(&self.transform);
        let outputs = Arc::clone(&self.outputs);
        let cancelled = Arc::clone(&self.cancelled);
        let worker_completion = completion.clone();
        let name = format!("hubble-processor-{index}");

        let spawned = thread::Builder::new().name(name.clone()).spawn(move || {
            let _guard = CompleteOnDrop(worker_completion.clone());
            let len = batch.len();
            let started = Instant::now();
            info!(batch = index, len, "processing batch");

            let result =
                sort_and_transform(batch.into_vec(), sort_threshold, sort_pass, &*transform);
            if cancelled.load(Ordering::SeqCst) {
                debug!(batch = index, "batch finished after cancellation, discarding");
                worker_completion.complete(Err(HubbleError::Interrupted));
                return;
            }

            match result {
                Ok(output) => {
                    lock(&outputs).push(output);
                    info!(batch = index, elapsed = ?started.elapsed(), "batch processed");
                    worker_completion.complete(Ok(()));
                }
                Err(err) => {
                    warn!(batch = index, error = %err, "batch processing failed");
                    worker_completion.complete(Err(err));
                }
            }
        });

        match spawned {
            Ok(handle) => lock(&self.workers).push(handle),
            Err(err) => {
                completion.complete(Err(HubbleError::ThreadSpawn {
                    name,
                    reason: err.to_string(),
                }));
            }
        }
    }

    fn completion_signal(&self) -> Completion {
        lock(&self.current).clone()
    }
}

impl<T, R> fmt::Debug for SortingProcessor<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortingProcessor")
            .field("sort_threshold", &self.sort_threshold)
            .field("dispatched", &self.dispatched.load(Ordering::SeqCst))
            .field("cancelled", &self.cancelled.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_then_transforms() {
        let processor = SortingProcessor::new(2, |sorted: &[i32]| sorted.to_vec()).unwrap();
        processor.on_batch_received(Batch::from(vec![5, 3, 9, 1]));

        assert_eq!(processor.completion_signal().wait(), Ok(()));
        processor.join();
        assert_eq!(processor.take_outputs(), vec![vec![1, 3, 5, 9]]);
    }

    #[test]
    fn test_threshold_clamped_to_short_batches() {
        let processor = SortingProcessor::new(64, |sorted: &[i32]| sorted.len()).unwrap();
        processor.on_batch_received(Batch::from(vec![2, 1, 3]));
        processor.completion_signal().wait().unwrap();

        processor.on_batch_received(Batch::from(vec![7]));
        processor.completion_signal().wait().unwrap();
        processor.join();

        assert_eq!(processor.take_outputs(), vec![3, 1]);
    }

    #[test]
    fn test_panicking_transform_still_completes() {
        let processor = SortingProcessor::new(2, |_: &[i32]| -> usize { panic!("boom") }).unwrap();
        processor.on_batch_received(Batch::from(vec![1, 2]));

        assert!(matches!(
            processor.completion_signal().wait(),
            Err(HubbleError::ProcessorFailed(_))
        ));
        processor.join();
    }

    #[test]
    fn test_cancel_before_dispatch() {
        let processor = SortingProcessor::new(2, |s: &[i32]| s.len()).unwrap();
        assert_eq!(processor.completion_signal().try_result(), Some(Ok(())));

        processor.cancel();
        processor.on_batch_received(Batch::from(vec![1, 2]));
        assert_eq!(processor.completion_signal().wait(), Err(HubbleError::Interrupted));
        assert!(processor.take_outputs().is_empty());
    }

    #[test]
    fn test_finished_workers_are_reaped() {
        let processor = SortingProcessor::new(2, |s: &[i32]| s.len()).unwrap();
        for _ in 0..50 {
            processor.on_batch_received(Batch::from(vec![3, 1, 2]));
            processor.completion_signal().wait().unwrap();
        }

        // Workers that completed but had not yet exited are reaped on a later batch.
        assert!(processor.live_workers() < 10);
        processor.join();
        assert_eq!(processor.live_workers(), 0);
        assert_eq!(processor.take_outputs().len(), 50);
    }

    #[test]
    fn test_rejects_small_sort_threshold() {
        assert!(SortingProcessor::new(1, |s: &[i32]| s.len()).is_err());
    }
}
