//! High-level API for hubble pipelines with parallel sorting.
//!
//! ## Purpose
//!
//! This module provides the primary user-facing entry point for `fastHubble`.
//! It extends the `hubble` pipeline builder so that every batch is sorted by
//! the fork-join parallel pass, and adds a standalone [`ParallelSorter`] that
//! can run on a dedicated thread pool.
//!
//! ## Design notes
//!
//! * **Fluent Integration**: Re-uses the base `hubble` builder pattern.
//! * **Parallel-First**: Pipelines sort in parallel unless `.parallel(false)` is set.
//! * **Feature-Gated**: Without the `cpu` feature the sequential pass is used.
//!
//! ### Configuration Flow
//!
//! 1. Create a [`ParallelPipelineBuilder`] via `Pipeline::new()`.
//! 2. Chain configuration methods (`.threshold()`, `.sort_threshold()`, etc.).
//! 3. Call `.build()` to get a [`HubblePipeline`] with the parallel pass injected.

// Feature-gated imports
#[cfg(feature = "cpu")]
use crate::engine::executor::{sort_by_parallel, sort_pass_parallel};
#[cfg(feature = "cpu")]
use crate::input::SortInput;
#[cfg(feature = "cpu")]
use core::cmp::Ordering;
#[cfg(feature = "cpu")]
use rayon::{ThreadPool, ThreadPoolBuilder};

// Export dependencies from hubble crate
use hubble::internals::algorithms::merge_sort::SortPassFn;

// Publicly re-exported types
pub use hubble::internals::algorithms::merge::{is_sorted_by, merge, merge_all, merge_by_key};
pub use hubble::internals::api::{
    HubblePipeline, PipelineBuilder, PipelineHandle, PipelineReport, DEFAULT_SORT_THRESHOLD,
    DEFAULT_THRESHOLD,
};
pub use hubble::internals::collections::ring_buffer::RingBuffer;
pub use hubble::internals::pipeline::producer::{RandomSource, ValueSource};
pub use hubble::internals::pipeline::receiver::{ReceiveMode, ReceiverState};
pub use hubble::internals::primitives::errors::HubbleError;

// ============================================================================
// Extended Pipeline Builder
// ============================================================================

/// Builder for a pipeline whose processor sorts batches in parallel.
#[derive(Debug, Clone)]
pub struct ParallelPipelineBuilder<T> {
    /// Base builder from the hubble crate
    pub base: PipelineBuilder<T>,

    /// Sort batches with the parallel pass.
    pub parallel: bool,
}

impl<T> Default for ParallelPipelineBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<PipelineBuilder<T>> for ParallelPipelineBuilder<T> {
    fn from(base: PipelineBuilder<T>) -> Self {
        Self {
            base,
            parallel: true,
        }
    }
}

impl<T> ParallelPipelineBuilder<T> {
    /// Create a new builder with default parameters.
    ///
    /// # Defaults
    ///
    /// * All base parameters from hubble `PipelineBuilder`
    /// * parallel: true (fastHubble extension)
    pub fn new() -> Self {
        Self::from(PipelineBuilder::new())
    }

    /// Set parallel sorting mode.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    // ========================================================================
    // Shared Setters
    // ========================================================================

    /// Set the ring buffer capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.base = self.base.capacity(capacity);
        self
    }

    /// Set the batch size the receiver waits for.
    pub fn threshold(mut self, threshold: usize) -> Self {
        self.base = self.base.threshold(threshold);
        self
    }

    /// Set the merge sort cutoff.
    pub fn sort_threshold(mut self, sort_threshold: usize) -> Self {
        self.base = self.base.sort_threshold(sort_threshold);
        self
    }

    /// Set how many batches to receive.
    pub fn mode(mut self, mode: ReceiveMode) -> Self {
        self.base = self.base.mode(mode);
        self
    }

    /// Stop the producer after `limit` values.
    pub fn production_limit(mut self, limit: usize) -> Self {
        self.base = self.base.production_limit(limit);
        self
    }
}

impl<T> ParallelPipelineBuilder<T>
where
    T: Ord + Clone + Send + 'static,
{
    fn sort_pass(&self) -> Option<SortPassFn<T>> {
        #[cfg(feature = "cpu")]
        {
            if self.parallel {
                return Some(sort_pass_parallel::<T> as SortPassFn<T>);
            }
        }
        None
    }

    // ========================================================================
    // Build Method
    // ========================================================================

    /// Validate the configuration and inject the selected sort pass.
    pub fn build(self) -> Result<HubblePipeline<T>, HubbleError> {
        let sort_pass = self.sort_pass();
        self.base.custom_sort_pass(sort_pass).build()
    }
}

// ============================================================================
// Standalone Parallel Sorter
// ============================================================================

/// Parallel threshold merge sort over slices, vectors and ndarray arrays.
///
/// Runs on rayon's global pool unless a thread count is given, in which case
/// a dedicated pool is created once and reused for every call.
#[cfg(feature = "cpu")]
#[derive(Debug)]
pub struct ParallelSorter {
    threshold: usize,
    pool: Option<ThreadPool>,
}

#[cfg(feature = "cpu")]
impl ParallelSorter {
    /// Create a sorter on the global pool.
    ///
    /// # Errors
    /// Returns [`HubbleError::InvalidArgument`] if `threshold < 2`.
    pub fn new(threshold: usize) -> Result<Self, HubbleError> {
        if threshold < 2 {
            return Err(HubbleError::InvalidArgument(format!(
                "sort threshold must be at least 2 (got {threshold})"
            )));
        }
        Ok(Self {
            threshold,
            pool: None,
        })
    }

    /// Create a sorter with its own pool of `threads` workers.
    ///
    /// # Errors
    /// Returns [`HubbleError::InvalidArgument`] for a zero thread count or a
    /// threshold below 2, and [`HubbleError::ThreadSpawn`] if the pool cannot start.
    pub fn with_threads(threshold: usize, threads: usize) -> Result<Self, HubbleError> {
        if threads == 0 {
            return Err(HubbleError::InvalidArgument(
                "thread count must be at least 1".into(),
            ));
        }
        let mut sorter = Self::new(threshold)?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("hubble-sort-{index}"))
            .build()
            .map_err(|err| HubbleError::ThreadSpawn {
                name: "hubble-sort".into(),
                reason: err.to_string(),
            })?;
        sorter.pool = Some(pool);
        Ok(sorter)
    }

    /// Sort cutoff.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of worker threads the sort runs on.
    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Sort `input` in ascending order.
    ///
    /// # Errors
    /// Fails for non-contiguous input or when the input is shorter than the threshold.
    pub fn sort<T, I>(&self, input: &mut I) -> Result<(), HubbleError>
    where
        T: Ord + Clone + Send,
        I: SortInput<T> + ?Sized,
    {
        self.sort_by(input, T::cmp)
    }

    /// Sort `input` with a custom comparator.
    pub fn sort_by<T, I, F>(&self, input: &mut I, compare: F) -> Result<(), HubbleError>
    where
        T: Clone + Send,
        I: SortInput<T> + ?Sized,
        F: Fn(&T, &T) -> Ordering + Sync + Send,
    {
        let slice = input.as_sort_slice_mut()?;
        let threshold = self.threshold;
        match &self.pool {
            Some(pool) => pool.install(|| sort_by_parallel(slice, threshold, compare)),
            None => sort_by_parallel(slice, threshold, compare),
        }
    }
}
