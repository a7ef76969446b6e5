//! Parallel execution engine for threshold merge sort.
//!
//! ## Purpose
//!
//! This module provides the parallel sort pass that is injected into the
//! `hubble` crate's processor. Above the threshold each range is split in two
//! and both halves are sorted concurrently with `rayon::join`; the halves are
//! then merged on the calling thread.
//!
//! ## Design notes
//!
//! * **Implementation**: Provides a drop-in replacement for the sequential sort pass.
//! * **Parallelism**: Uses `rayon` fork-join; the pool's work stealing bounds the
//!   number of live tasks, so the recursion never oversubscribes the machine.
//! * **Shared building blocks**: Reuses `hubble`'s quadratic pass and merge step,
//!   so sequential and parallel results are identical element for element.
//!
//! ## Key concepts
//!
//! * **Fork-join**: The two halves of every range at or above the threshold are
//!   independent tasks; the merge waits for both.
//! * **Partitioned sort**: Independently sorted partitions reduced with a
//!   pairwise k-way merge.
//! * **Integration**: Plugs into the `hubble` processor via the `SortPassFn` hook.
//!
//! ## Invariants
//!
//! * `2 <= threshold <= slice.len()` is checked before any element moves.
//! * Equal elements keep their input order.
//!
//! ## Non-goals
//!
//! * This module does not own a thread pool (callers choose one via `install`).

// Feature-gated imports
#[cfg(feature = "cpu")]
use rayon::prelude::*;

// External dependencies
#[cfg(feature = "cpu")]
use core::cmp::Ordering;

// Export dependencies from hubble crate
#[cfg(feature = "cpu")]
use hubble::internals::algorithms::merge::merge_all;
#[cfg(feature = "cpu")]
use hubble::internals::algorithms::merge_sort::{
    merge_halves_by, simple_sort_by, validate_threshold,
};
#[cfg(feature = "cpu")]
use hubble::internals::primitives::errors::{HubbleError, Result};

// ============================================================================
// Parallel Sort Pass
// ============================================================================

#[cfg(feature = "cpu")]
fn sort_range_parallel<T, F>(slice: &mut [T], threshold: usize, compare: &F)
where
    T: Clone + Send,
    F: Fn(&T, &T) -> Ordering + Sync,
{
    if slice.len() < threshold {
        simple_sort_by(slice, compare);
        return;
    }

    let mid = slice.len() / 2;
    {
        let (left, right) = slice.split_at_mut(mid);
        rayon::join(
            || sort_range_parallel(left, threshold, compare),
            || sort_range_parallel(right, threshold, compare),
        );
    }
    merge_halves_by(slice, mid, compare);
}

/// Sort `slice` with a custom comparator, forking at every split.
///
/// # Errors
/// Returns [`HubbleError::InvalidThreshold`] unless `2 <= threshold <= slice.len()`.
#[cfg(feature = "cpu")]
pub fn sort_by_parallel<T, F>(slice: &mut [T], threshold: usize, compare: F) -> Result<()>
where
    T: Clone + Send,
    F: Fn(&T, &T) -> Ordering + Sync,
{
    validate_threshold(threshold, slice.len())?;
    sort_range_parallel(slice, threshold, &compare);
    Ok(())
}

/// Parallel [`SortPassFn`](hubble::internals::algorithms::merge_sort::SortPassFn):
/// ascending order on the current rayon pool.
#[cfg(feature = "cpu")]
pub fn sort_pass_parallel<T>(slice: &mut [T], threshold: usize) -> Result<()>
where
    T: Ord + Clone + Send,
{
    sort_by_parallel(slice, threshold, T::cmp)
}

// ============================================================================
// Partitioned Sort
// ============================================================================

/// Split `values` into `partitions` contiguous chunks, sort each chunk in
/// parallel, then reduce them with a k-way merge.
///
/// The threshold is clamped to each chunk's length; chunks shorter than two
/// elements are already sorted.
///
/// # Errors
/// Returns [`HubbleError::InvalidArgument`] if `partitions` is zero or
/// `threshold < 2`.
#[cfg(feature = "cpu")]
pub fn sort_partitioned<T>(mut values: Vec<T>, partitions: usize, threshold: usize) -> Result<Vec<T>>
where
    T: Ord + Clone + Send,
{
    if partitions == 0 {
        return Err(HubbleError::InvalidArgument(
            "partition count must be at least 1".into(),
        ));
    }
    if threshold < 2 {
        return Err(HubbleError::InvalidArgument(format!(
            "sort threshold must be at least 2 (got {threshold})"
        )));
    }
    if values.len() < 2 {
        return Ok(values);
    }

    let chunk_len = values.len().div_ceil(partitions);
    values.par_chunks_mut(chunk_len).for_each(|chunk| {
        if chunk.len() >= 2 {
            sort_range_parallel(chunk, threshold.min(chunk.len()), &T::cmp);
        }
    });

    let runs: Vec<Vec<T>> = values.chunks(chunk_len).map(<[T]>::to_vec).collect();
    Ok(merge_all(runs))
}
