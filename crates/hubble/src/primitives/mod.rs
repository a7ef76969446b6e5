//! Layer 1: Primitives
//!
//! # Purpose
//!
//! This layer provides the storage abstraction, index arithmetic and error
//! types used throughout the crate. It has zero internal dependencies within
//! the crate.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: API
//!   ↓
//! Layer 4: Pipeline
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Collections
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Shared error types.
pub mod errors;

/// Fixed-length indexed containers.
pub mod container;

/// Wrap-around index arithmetic.
pub mod index;
