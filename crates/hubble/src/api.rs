//! High-level API for running a producer/receiver pipeline.
//!
//! ## Purpose
//!
//! This module provides the user-facing entry point. A fluent builder collects
//! the buffer capacity, the receiver threshold, the sort cutoff and the receive
//! mode; `build()` validates them and returns a [`HubblePipeline`] that can be
//! run any number of times.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Every parameter has a default derived from the threshold.
//! * **Validated**: Duplicate setters and invalid values surface from `build()`.
//! * **Named threads**: Producer and receiver run on `hubble-producer` and
//!   `hubble-receiver`; the processor names its own workers.
//!
//! ### Configuration Flow
//!
//! 1. Create a [`PipelineBuilder`] via `Pipeline::new()`.
//! 2. Chain configuration methods (`.threshold()`, `.capacity()`, etc.).
//! 3. Call `.build()` and then `.run(source, transform)`.

// External dependencies
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{info, warn};

// Internal dependencies
use crate::algorithms::merge_sort::SortPassFn;
use crate::collections::ring_buffer::RingBuffer;
use crate::pipeline::processor::SortingProcessor;
use crate::pipeline::producer::{Producer, ValueSource};
use crate::pipeline::receiver::Receiver;
use crate::pipeline::signal::StopHandle;

// Publicly re-exported types
pub use crate::algorithms::merge::{is_sorted_by, merge, merge_all, merge_by, merge_by_key};
pub use crate::algorithms::merge_sort::{sort, sort_by, sort_by_key, sort_range};
pub use crate::collections::observer::SizeObserver;
pub use crate::collections::ring_buffer::{Batch, Iter};
pub use crate::pipeline::completion::Completion;
pub use crate::pipeline::processor::Processor;
pub use crate::pipeline::producer::RandomSource;
pub use crate::pipeline::receiver::{ReceiveMode, ReceiverState};
pub use crate::primitives::errors::HubbleError;

/// Receiver threshold used when none is configured.
pub const DEFAULT_THRESHOLD: usize = 1024;

/// Sort cutoff used when none is configured.
pub const DEFAULT_SORT_THRESHOLD: usize = 32;

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder for configuring a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineBuilder<T> {
    /// Ring buffer capacity (default: twice the threshold).
    pub capacity: Option<usize>,

    /// Number of elements per batch.
    pub threshold: Option<usize>,

    /// Sub-range length below which the sort stops recursing.
    pub sort_threshold: Option<usize>,

    /// Number of batches to receive.
    pub mode: Option<ReceiveMode>,

    /// Stop producing after this many values.
    pub production_limit: Option<usize>,

    // ======================================
    // DEV
    // ======================================
    /// Custom sort pass function.
    #[doc(hidden)]
    pub custom_sort_pass: Option<SortPassFn<T>>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl<T> Default for PipelineBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PipelineBuilder<T> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            capacity: None,
            threshold: None,
            sort_threshold: None,
            mode: None,
            production_limit: None,
            custom_sort_pass: None,
            duplicate_param: None,
        }
    }

    /// Set the ring buffer capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        if self.capacity.is_some() {
            self.duplicate_param = Some("capacity");
        }
        self.capacity = Some(capacity);
        self
    }

    /// Set the batch size the receiver waits for.
    pub fn threshold(mut self, threshold: usize) -> Self {
        if self.threshold.is_some() {
            self.duplicate_param = Some("threshold");
        }
        self.threshold = Some(threshold);
        self
    }

    /// Set the merge sort cutoff.
    pub fn sort_threshold(mut self, sort_threshold: usize) -> Self {
        if self.sort_threshold.is_some() {
            self.duplicate_param = Some("sort_threshold");
        }
        self.sort_threshold = Some(sort_threshold);
        self
    }

    /// Set how many batches to receive.
    pub fn mode(mut self, mode: ReceiveMode) -> Self {
        if self.mode.is_some() {
            self.duplicate_param = Some("mode");
        }
        self.mode = Some(mode);
        self
    }

    /// Stop the producer after `limit` values.
    ///
    /// A limit too small to fill every requested batch leaves the receiver
    /// blocked until the pipeline is stopped.
    pub fn production_limit(mut self, limit: usize) -> Self {
        if self.production_limit.is_some() {
            self.duplicate_param = Some("production_limit");
        }
        self.production_limit = Some(limit);
        self
    }

    /// Replace the sort pass used by the processor.
    #[doc(hidden)]
    pub fn custom_sort_pass(mut self, sort_pass: Option<SortPassFn<T>>) -> Self {
        self.custom_sort_pass = sort_pass;
        self
    }

    /// Validate the configuration.
    pub fn build(self) -> Result<HubblePipeline<T>, HubbleError> {
        if let Some(parameter) = self.duplicate_param {
            return Err(HubbleError::DuplicateParameter { parameter });
        }

        let threshold = self.threshold.unwrap_or(DEFAULT_THRESHOLD);
        let capacity = self.capacity.unwrap_or(threshold.saturating_mul(2));
        let sort_threshold = self.sort_threshold.unwrap_or(DEFAULT_SORT_THRESHOLD);

        if capacity == 0 {
            return Err(HubbleError::InvalidCapacity(capacity));
        }
        if threshold == 0 || threshold > capacity {
            return Err(HubbleError::InvalidArgument(format!(
                "threshold {threshold} must be between 1 and the capacity {capacity}"
            )));
        }
        if sort_threshold < 2 {
            return Err(HubbleError::InvalidArgument(format!(
                "sort threshold must be at least 2 (got {sort_threshold})"
            )));
        }

        Ok(HubblePipeline {
            capacity,
            threshold,
            sort_threshold,
            mode: self.mode.unwrap_or_default(),
            production_limit: self.production_limit,
            sort_pass: self.custom_sort_pass,
        })
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Validated pipeline configuration.
#[derive(Debug, Clone)]
pub struct HubblePipeline<T> {
    capacity: usize,
    threshold: usize,
    sort_threshold: usize,
    mode: ReceiveMode,
    production_limit: Option<usize>,
    sort_pass: Option<SortPassFn<T>>,
}

fn spawn_named<F, O>(name: &str, body: F) -> Result<JoinHandle<O>, HubbleError>
where
    F: FnOnce() -> O + Send + 'static,
    O: Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(body)
        .map_err(|err| HubbleError::ThreadSpawn {
            name: name.to_string(),
            reason: err.to_string(),
        })
}

impl<T> HubblePipeline<T>
where
    T: Ord + Clone + Default + Send + 'static,
{
    /// Ring buffer capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Batch size.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Merge sort cutoff.
    pub fn sort_threshold(&self) -> usize {
        self.sort_threshold
    }

    /// Receive mode.
    pub fn mode(&self) -> ReceiveMode {
        self.mode
    }

    /// Start the producer and receiver threads and return immediately.
    pub fn spawn<S, F, R>(
        &self,
        source: S,
        transform: F,
    ) -> Result<PipelineHandle<T, R>, HubbleError>
    where
        S: ValueSource<T> + 'static,
        F: Fn(&[T]) -> R + Send + Sync + 'static,
        R: Send + 'static,
    {
        let buffer = Arc::new(RingBuffer::new(self.capacity)?);

        let mut processor = SortingProcessor::new(self.sort_threshold, transform)?;
        if let Some(sort_pass) = self.sort_pass {
            processor = processor.with_sort_pass(sort_pass);
        }
        let processor = Arc::new(processor);

        let mut receiver =
            Receiver::new(Arc::clone(&buffer), Arc::clone(&processor), self.threshold)?
                .with_mode(self.mode);
        let mut producer = Producer::new(Arc::clone(&buffer), source);
        if let Some(limit) = self.production_limit {
            producer = producer.with_limit(limit);
        }

        let receiver_stop = receiver.stop_handle();
        let producer_stop = producer.stop_handle();

        info!(
            capacity = self.capacity,
            threshold = self.threshold,
            sort_threshold = self.sort_threshold,
            mode = ?self.mode,
            "starting pipeline"
        );
        let started = Instant::now();

        let receiver = spawn_named("hubble-receiver", move || {
            let batches = receiver.run();
            (batches, receiver.state())
        })?;
        let producer = match spawn_named("hubble-producer", move || producer.run()) {
            Ok(handle) => handle,
            Err(err) => {
                receiver_stop.stop();
                processor.cancel();
                let _ = receiver.join();
                return Err(err);
            }
        };

        Ok(PipelineHandle {
            buffer,
            processor,
            producer,
            receiver,
            producer_stop,
            receiver_stop,
            started,
        })
    }

    /// Run to completion: wait for the receiver, then stop the producer.
    ///
    /// With [`ReceiveMode::Continuous`] this only returns once another thread
    /// stops the pipeline; use [`HubblePipeline::spawn`] instead.
    pub fn run<S, F, R>(&self, source: S, transform: F) -> Result<PipelineReport<R>, HubbleError>
    where
        S: ValueSource<T> + 'static,
        F: Fn(&[T]) -> R + Send + Sync + 'static,
        R: Send + 'static,
    {
        self.spawn(source, transform)?.join()
    }
}

// ============================================================================
// Handle
// ============================================================================

/// A running pipeline.
pub struct PipelineHandle<T, R> {
    buffer: Arc<RingBuffer<T>>,
    processor: Arc<SortingProcessor<T, R>>,
    producer: JoinHandle<usize>,
    receiver: JoinHandle<(Result<usize, HubbleError>, ReceiverState)>,
    producer_stop: StopHandle,
    receiver_stop: StopHandle,
    started: Instant,
}

impl<T, R> PipelineHandle<T, R>
where
    T: Ord + Clone + Default + Send + 'static,
    R: Send + 'static,
{
    /// The shared ring buffer.
    pub fn buffer(&self) -> &Arc<RingBuffer<T>> {
        &self.buffer
    }

    /// Ask every participant to stop. Returns immediately.
    pub fn stop(&self) {
        info!("pipeline stop requested");
        self.receiver_stop.stop();
        self.processor.cancel();
        self.producer_stop.stop();
    }

    /// Wait for the receiver to finish, stop the producer and collect results.
    ///
    /// # Errors
    /// Returns the processor's error if a batch failed, or
    /// [`HubbleError::ProcessorFailed`] if the receiver thread panicked.
    pub fn join(self) -> Result<PipelineReport<R>, HubbleError> {
        let received = self.receiver.join();

        self.producer_stop.stop();
        self.processor.cancel();
        let produced = self.producer.join().unwrap_or_else(|_| {
            warn!("producer thread panicked");
            0
        });
        self.processor.join();

        let (batches, state) = received
            .map_err(|_| HubbleError::ProcessorFailed("receiver thread panicked".into()))?;
        let batches = batches?;

        let report = PipelineReport {
            batches,
            produced,
            state,
            remaining: self.buffer.size(),
            outputs: self.processor.take_outputs(),
            elapsed: self.started.elapsed(),
        };
        info!(
            batches = report.batches,
            produced = report.produced,
            elapsed = ?report.elapsed,
            "pipeline finished"
        );
        Ok(report)
    }
}

impl<T, R> fmt::Debug for PipelineHandle<T, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineHandle")
            .field("producer_stopped", &self.producer_stop.is_stopped())
            .field("receiver_stopped", &self.receiver_stop.is_stopped())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Report
// ============================================================================

/// Outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport<R> {
    /// Batches processed to completion.
    pub batches: usize,

    /// Values the producer added to the buffer.
    pub produced: usize,

    /// Final receiver state.
    pub state: ReceiverState,

    /// Elements left in the buffer after the run.
    pub remaining: usize,

    /// Transform output for each processed batch.
    pub outputs: Vec<R>,

    /// Wall-clock time from start to join.
    pub elapsed: Duration,
}

impl<R> Display for PipelineReport<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "  Batches:   {}", self.batches)?;
        writeln!(f, "  Produced:  {}", self.produced)?;
        writeln!(f, "  Remaining: {}", self.remaining)?;
        writeln!(f, "  State:     {:?}", self.state)?;
        write!(f, "  Elapsed:   {:.3?}", self.elapsed)
    }
}
