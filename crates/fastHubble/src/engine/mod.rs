//! Layer 5: Engine
//!
//! This layer provides the parallel execution engine for hubble sorting.
//! It distributes the recursive halves of a merge sort across CPU cores.

// Parallel execution engine using CPU threads
pub mod executor;
