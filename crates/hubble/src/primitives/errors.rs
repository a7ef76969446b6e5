//! Error types for buffer, sorting and pipeline operations.
//!
//! ## Purpose
//!
//! This module defines the error conditions that can occur while constructing
//! a ring buffer, sorting a batch, or running the producer/receiver pipeline.
//!
//! ## Design notes
//!
//! * **Contextual**: Errors include relevant values (e.g., threshold vs. length).
//! * **Deferred**: Builder errors are recorded during configuration and surfaced by `build()`.
//! * **Boolean capacity**: A full buffer is never an error; `add`/`add_all` return `false`.
//!
//! ## Key concepts
//!
//! 1. **Invalid argument**: zero capacity, threshold outside `[2, len]`, bad ranges.
//! 2. **Interrupted**: cooperative cancellation observed while blocked.
//! 3. **Processor failure**: a batch could not be processed to completion.
//!
//! ## Invariants
//!
//! * All variants provide sufficient context for diagnosis.
//! * Only invalid construction parameters are meant to abort a caller early.
//!
//! ## Non-goals
//!
//! * This module does not perform the validation logic itself.

use thiserror::Error;

// ============================================================================
// Error Type
// ============================================================================

/// Error type for hubble operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubbleError {
    /// A ring buffer must be able to hold at least one element.
    #[error("Invalid capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),

    /// Sort threshold must lie in `[2, len]`.
    #[error("Invalid threshold: {threshold} (must be between 2 and the slice length {len})")]
    InvalidThreshold {
        /// The threshold provided.
        threshold: usize,
        /// Length of the slice being sorted.
        len: usize,
    },

    /// An inclusive range was reversed or exceeded the backing store.
    #[error("Invalid range [{start}, {end}] for length {len}")]
    InvalidRange {
        /// Inclusive start index.
        start: usize,
        /// Inclusive end index.
        end: usize,
        /// Length of the container.
        len: usize,
    },

    /// Generic invalid argument with a descriptive message.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Parameter was set multiple times in a builder.
    #[error("Parameter '{parameter}' was set multiple times. Each parameter can only be configured once.")]
    DuplicateParameter {
        /// Name of the parameter that was set multiple times.
        parameter: &'static str,
    },

    /// A blocked participant observed a stop request.
    #[error("Operation interrupted by a stop request")]
    Interrupted,

    /// A pipeline thread could not be started.
    #[error("Failed to spawn thread '{name}': {reason}")]
    ThreadSpawn {
        /// Name given to the thread.
        name: String,
        /// Error reported by the operating system.
        reason: String,
    },

    /// The processor could not finish a batch.
    #[error("Processor failed: {0}")]
    ProcessorFailed(String),
}

/// Convenience alias used across the crate.
pub type Result<T> = core::result::Result<T, HubbleError>;
