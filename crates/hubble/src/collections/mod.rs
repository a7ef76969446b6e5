//! Layer 2: Collections
//!
//! This layer provides the bounded ring buffer and the observer registry it
//! uses to report size changes. Everything here is safe to share between
//! threads; the pipeline layer builds its signaling on top of it.

// Size-change callbacks and their registry.
pub mod observer;

// Bounded FIFO with batched notification.
pub mod ring_buffer;
