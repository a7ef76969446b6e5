//! # hubble: bounded ring buffer pipeline with threshold merge sort
//!
//! `hubble` coordinates a single producer thread and a single receiver thread
//! around a fixed-capacity, observable ring buffer. The receiver waits until
//! the buffer holds a configured number of elements, detaches them in one
//! atomic `take`, and hands the batch to a processor that sorts it with a
//! threshold-cutoff merge sort before applying a transform.
//!
//! ## Quick Start
//!
//! ### Ring buffer
//!
//! ```rust
//! use hubble::prelude::*;
//!
//! let buffer = RingBuffer::new(4)?;
//! for value in 1..=4 {
//!     assert!(buffer.add(value));
//! }
//! assert!(buffer.is_full());
//! assert!(!buffer.add(5));
//!
//! assert_eq!(buffer.take(2).as_slice(), &[1, 2]);
//! assert!(buffer.add_all([5, 6], true));
//! assert_eq!(buffer.iter().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
//! # Result::<(), HubbleError>::Ok(())
//! ```
//!
//! ### Pipeline
//!
//! ```rust
//! use hubble::prelude::*;
//!
//! let pipeline = Pipeline::new()
//!     .threshold(64)          // Batch size the receiver waits for
//!     .sort_threshold(8)      // Merge sort cutoff
//!     .mode(Repeat(2))        // Receive two batches
//!     .build()?;
//!
//! let report = pipeline.run(RandomSource::seeded(7), |sorted: &[i32]| {
//!     (sorted[0], sorted[sorted.len() - 1])
//! })?;
//!
//! assert_eq!(report.batches, 2);
//! for (min, max) in &report.outputs {
//!     assert!(min <= max);
//! }
//! println!("{}", report);
//! # Result::<(), HubbleError>::Ok(())
//! ```
//!
//! ### Sorting and merging
//!
//! ```rust
//! use hubble::prelude::*;
//!
//! let mut values = vec![5, 1, 4, 2, 3];
//! sort(&mut values, 2)?;
//! assert_eq!(values, vec![1, 2, 3, 4, 5]);
//!
//! // Stable: on equal keys the left input wins.
//! let merged = merge_by_key(&[(1, "a"), (2, "b")], &[(1, "c")], |p| p.0);
//! assert_eq!(merged, vec![(1, "a"), (1, "c"), (2, "b")]);
//! # Result::<(), HubbleError>::Ok(())
//! ```
//!
//! ## Error Handling
//!
//! Invalid construction parameters (zero capacity, a sort threshold outside
//! `[2, len]`, a receiver threshold above the capacity) are reported as
//! [`HubbleError`](prelude::HubbleError). A full buffer is **not** an error:
//! `add` and `add_all` return `false` and callers must check the result.
//!
//! ## Logging
//!
//! Pipeline transitions are reported through [`tracing`](https://docs.rs/tracing).
//! The crate never installs a subscriber.
//!
//! ## License
//!
//! See the repository for license information and contribution guidelines.

// Layer 1: Primitives - storage, index arithmetic and errors.
mod primitives;

// Layer 2: Collections - ring buffer and observers.
mod collections;

// Layer 3: Algorithms - merge sort and merging.
mod algorithms;

// Layer 4: Pipeline - producer, receiver and processor coordination.
mod pipeline;

// High-level fluent API for running pipelines.
mod api;

// Standard hubble prelude.
pub mod prelude {
    pub use crate::api::{
        is_sorted_by, merge, merge_all, merge_by, merge_by_key, sort, sort_by, sort_by_key,
        sort_range, Batch, Completion, HubbleError, HubblePipeline, PipelineBuilder as Pipeline,
        PipelineHandle, PipelineReport, Processor, RandomSource,
        ReceiveMode::{self, Continuous, OneShot, Repeat},
        ReceiverState, SizeObserver,
    };
    pub use crate::collections::ring_buffer::RingBuffer;
    pub use crate::pipeline::processor::SortingProcessor;
    pub use crate::pipeline::producer::{Producer, ValueSource};
    pub use crate::pipeline::receiver::Receiver;
    pub use crate::pipeline::signal::StopHandle;
}

// Internal modules for development and testing.
//
// This module re-exports internal modules for development and testing purposes.
// It is only available with the `dev` feature enabled.
#[cfg(feature = "dev")]
pub mod internals {
    pub mod primitives {
        pub use crate::primitives::*;
    }
    pub mod collections {
        pub use crate::collections::*;
    }
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    pub mod pipeline {
        pub use crate::pipeline::*;
    }
    pub mod api {
        pub use crate::api::*;
    }
}
