//! Layer 4: Pipeline
//!
//! This layer coordinates one producer thread, one receiver thread and the
//! processor's worker threads around a shared ring buffer. Blocking is built
//! on size-change signals registered as buffer observers; cancellation is
//! cooperative and observed at the next wake-up.

// Blocking size-change signals and stop handles.
pub mod signal;

// One-shot, multi-waiter completion cells.
pub mod completion;

// Value sources and the backpressure-aware producer.
pub mod producer;

// Processor capability and the sorting processor.
pub mod processor;

// Threshold-driven batch receiver.
pub mod receiver;
