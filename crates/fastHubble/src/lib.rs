//! # fastHubble: parallel sorting and satellite simulation for hubble
//!
//! `fastHubble` extends [`hubble`] with a fork-join parallel merge sort built
//! on [rayon](https://docs.rs/rayon). Pipelines built through this crate sort
//! every batch in parallel by default, and a standalone [`ParallelSorter`]
//! sorts slices, vectors and `ndarray` arrays in place.
//!
//! [`ParallelSorter`]: prelude::ParallelSorter
//!
//! ## Quick Start
//!
//! ### Parallel pipeline
//!
//! ```rust
//! use fastHubble::prelude::*;
//!
//! let pipeline = Pipeline::new()
//!     .threshold(1024)        // Batch size the receiver waits for
//!     .sort_threshold(64)     // Merge sort cutoff
//!     .parallel(true)         // Parallel sort pass (default)
//!     .build()?;
//!
//! let report = pipeline.run(RandomSource::seeded(42), |sorted: &[i32]| {
//!     is_sorted_by(sorted, i32::cmp)
//! })?;
//!
//! assert_eq!(report.outputs, vec![true]);
//! # Result::<(), HubbleError>::Ok(())
//! ```
//!
//! ### Sorting arrays
//!
//! ```rust
//! use fastHubble::prelude::*;
//! use ndarray::Array1;
//!
//! let sorter = ParallelSorter::new(16)?;
//!
//! let mut values = Array1::from_vec((0..1000).rev().collect::<Vec<i64>>());
//! sorter.sort(&mut values)?;
//! assert_eq!(values[0], 0);
//! assert_eq!(values[999], 999);
//! # Result::<(), HubbleError>::Ok(())
//! ```
//!
//! ### Satellite simulation
//!
//! ```rust
//! use fastHubble::prelude::*;
//!
//! let config = SimulationConfig::from_json(r#"{"i": 4, "j": 1, "seed": 7}"#)?;
//! let report = Simulation::new(config)?.run()?;
//!
//! assert_eq!(report.frame.side(), 16);
//! assert_eq!(report.frame.pixels().len(), 256);
//! println!("{}", report);
//! # Result::<(), SimulationError>::Ok(())
//! ```
//!
//! ## Features
//!
//! * `cpu` (default): the rayon-backed parallel sort pass and [`ParallelSorter`].
//!   Without it, pipelines fall back to the sequential pass.
//! * `dev`: re-exports the internal layers for tests and benchmarks.
//!
//! ## License
//!
//! See the repository for license information and contribution guidelines.

#![allow(non_snake_case)]

// Layer 5: Engine - parallel sort passes.
mod engine;

// Layer 6: Simulation - satellite frame capture.
mod simulation;

// High-level fluent API for parallel pipelines.
mod api;

// Input data handling.
mod input;

// Standard fastHubble prelude.
pub mod prelude {
    #[cfg(feature = "cpu")]
    pub use crate::api::ParallelSorter;
    pub use crate::api::{
        is_sorted_by, merge, merge_all, merge_by_key, HubbleError, HubblePipeline,
        ParallelPipelineBuilder as Pipeline, PipelineHandle, PipelineReport, RandomSource,
        ReceiveMode::{self, Continuous, OneShot, Repeat},
        ReceiverState, RingBuffer, ValueSource,
    };
    pub use crate::input::SortInput;
    pub use crate::simulation::config::SimulationConfig;
    pub use crate::simulation::frame::{normalize, GrayscaleFrame};
    pub use crate::simulation::{Simulation, SimulationError, SimulationReport};
}

// Internal modules for development and testing.
//
// This module re-exports internal modules for development and testing purposes.
// It is only available with the `dev` feature enabled.
#[cfg(feature = "dev")]
pub mod internals {
    pub mod engine {
        pub use crate::engine::*;
    }
    pub mod simulation {
        pub use crate::simulation::*;
    }
    pub mod input {
        pub use crate::input::*;
    }
    pub mod api {
        pub use crate::api::*;
    }
}
