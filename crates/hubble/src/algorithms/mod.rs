//! Layer 3: Algorithms
//!
//! This layer implements the threshold-cutoff merge sort and the merge
//! utilities used to order and reduce batches. It has no knowledge of the
//! ring buffer or the pipeline.

// Sequential merge sort and the pluggable sort-pass hook.
pub mod merge_sort;

// Two-way and k-way merging of sorted sequences.
pub mod merge;
