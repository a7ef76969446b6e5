//! Threshold-cutoff merge sort.
//!
//! ## Purpose
//!
//! This module implements the divide-and-conquer merge sort used to order the
//! batches a receiver detaches from the ring buffer. Ranges shorter than the
//! threshold are finished with a simple quadratic pass; longer ranges are split,
//! sorted independently and merged back through an auxiliary buffer.
//!
//! ## Design notes
//!
//! * **Sequential reference**: This crate ships the single-threaded pass. The
//!   parallel pass lives in `fastHubble` and is injected through [`SortPassFn`].
//! * **Shared building blocks**: [`simple_sort_by`] and [`merge_halves_by`] are
//!   public so that alternative passes produce byte-identical results.
//! * **Stable**: The simple pass only moves an element past a strictly greater
//!   neighbour, and the merge step takes from the left half on ties.
//!
//! ## Key concepts
//!
//! * **Threshold**: Sub-range length below which recursion stops.
//! * **Split point**: A range of length `len` is split into its first `len / 2`
//!   elements and the rest, so both halves are non-empty whenever `len >= 2`.
//!
//! ## Invariants
//!
//! * `2 <= threshold <= slice.len()` is checked before any element moves.
//! * After a successful call the slice is a stable permutation of its input.
//!
//! ## Non-goals
//!
//! * This module does not schedule work across threads.

// External dependencies
use core::cmp::Ordering;

// Internal dependencies
use crate::primitives::errors::{HubbleError, Result};
use crate::primitives::index::span_len;

// ============================================================================
// Type Definitions
// ============================================================================

/// Signature for a pluggable sort pass.
///
/// Receives the batch and an already validated threshold.
#[doc(hidden)]
pub type SortPassFn<T> = fn(&mut [T], usize) -> Result<()>;

// ============================================================================
// Validation
// ============================================================================

/// Check that `threshold` lies in `[2, len]`.
pub fn validate_threshold(threshold: usize, len: usize) -> Result<()> {
    if threshold < 2 || threshold > len {
        return Err(HubbleError::InvalidThreshold { threshold, len });
    }
    Ok(())
}

// ============================================================================
// Building Blocks
// ============================================================================

/// Stable quadratic sort used below the threshold.
///
/// Each element is walked left past every strictly greater neighbour; equal
/// keys never cross.
pub fn simple_sort_by<T, F>(slice: &mut [T], compare: &F)
where
    F: Fn(&T, &T) -> Ordering,
{
    for i in 1..slice.len() {
        let mut j = i;
        while j > 0 && compare(&slice[j - 1], &slice[j]) == Ordering::Greater {
            slice.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Merge the sorted runs `slice[..mid]` and `slice[mid..]` in place.
///
/// An auxiliary buffer of `slice.len()` elements holds the merged result, which
/// is then copied back. The left run wins ties.
pub fn merge_halves_by<T, F>(slice: &mut [T], mid: usize, compare: &F)
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let (left, right) = slice.split_at(mid);

    // Already in order: nothing to merge.
    if left.is_empty()
        || right.is_empty()
        || compare(&left[mid - 1], &right[0]) != Ordering::Greater
    {
        return;
    }

    let mut merged = Vec::with_capacity(slice.len());
    merge_into(left, right, compare, &mut merged);
    slice.clone_from_slice(&merged);
}

/// Append the stable merge of `left` and `right` to `out`.
pub(crate) fn merge_into<T, F>(left: &[T], right: &[T], compare: &F, out: &mut Vec<T>)
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if compare(&left[i], &right[j]) == Ordering::Greater {
            out.push(right[j].clone());
            j += 1;
        } else {
            out.push(left[i].clone());
            i += 1;
        }
    }
    out.extend_from_slice(&left[i..]);
    out.extend_from_slice(&right[j..]);
}

// ============================================================================
// Sequential Sort
// ============================================================================

fn sort_range_by<T, F>(slice: &mut [T], threshold: usize, compare: &F)
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    if slice.len() < threshold {
        simple_sort_by(slice, compare);
        return;
    }

    let mid = slice.len() / 2;
    {
        let (left, right) = slice.split_at_mut(mid);
        sort_range_by(left, threshold, compare);
        sort_range_by(right, threshold, compare);
    }
    merge_halves_by(slice, mid, compare);
}

/// Sort `slice` with a custom comparator.
///
/// # Errors
/// Returns [`HubbleError::InvalidThreshold`] unless `2 <= threshold <= slice.len()`.
pub fn sort_by<T, F>(slice: &mut [T], threshold: usize, compare: F) -> Result<()>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    validate_threshold(threshold, slice.len())?;
    sort_range_by(slice, threshold, &compare);
    Ok(())
}

/// Sort `slice` in ascending order.
///
/// Runs on the calling thread. The fork-join version, which sorts the two
/// halves of every split concurrently on a rayon pool, is provided by the
/// `fastHubble` crate (`ParallelSorter`).
///
/// # Errors
/// Returns [`HubbleError::InvalidThreshold`] unless `2 <= threshold <= slice.len()`.
pub fn sort<T: Ord + Clone>(slice: &mut [T], threshold: usize) -> Result<()> {
    sort_by(slice, threshold, T::cmp)
}

/// Sort `slice` by the key extracted with `key`.
pub fn sort_by_key<T, K, F>(slice: &mut [T], threshold: usize, key: F) -> Result<()>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    sort_by(slice, threshold, |a, b| key(a).cmp(&key(b)))
}

/// Sort only the inclusive sub-range `[start, end]` of `slice`.
///
/// # Errors
/// Returns [`HubbleError::InvalidRange`] for a reversed or out-of-bounds range,
/// and [`HubbleError::InvalidThreshold`] unless `2 <= threshold <= end - start + 1`.
pub fn sort_range<T: Ord + Clone>(
    slice: &mut [T],
    start: usize,
    end: usize,
    threshold: usize,
) -> Result<()> {
    let len = span_len(start, end, slice.len())?;
    validate_threshold(threshold, len)?;
    sort_range_by(&mut slice[start..start + len], threshold, &T::cmp);
    Ok(())
}

/// Default [`SortPassFn`]: single-threaded ascending sort.
pub fn sort_pass_sequential<T: Ord + Clone>(slice: &mut [T], threshold: usize) -> Result<()> {
    sort(slice, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_sort_is_stable() {
        // (key, tag): the quadratic pass must not reorder equal keys.
        let mut v = vec![(2, 'a'), (2, 'b'), (1, 'c'), (2, 'd'), (1, 'e')];
        simple_sort_by(&mut v, &|a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0));
        assert_eq!(v, vec![(1, 'c'), (1, 'e'), (2, 'a'), (2, 'b'), (2, 'd')]);
    }

    #[test]
    fn test_merge_halves_left_wins_ties() {
        let mut v = vec![(1, 'a'), (3, 'b'), (1, 'c'), (2, 'd')];
        merge_halves_by(&mut v, 2, &|a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0));
        assert_eq!(v, vec![(1, 'a'), (1, 'c'), (2, 'd'), (3, 'b')]);
    }

    #[test]
    fn test_two_elements_at_minimum_threshold() {
        // A range of length two at threshold two must split, not recurse on itself.
        let mut v = vec![2, 1];
        sort(&mut v, 2).unwrap();
        assert_eq!(v, vec![1, 2]);
    }

    #[test]
    fn test_sort_range_leaves_outside_untouched() {
        let mut v = vec![9, 5, 4, 3, 8, 0];
        sort_range(&mut v, 1, 4, 2).unwrap();
        assert_eq!(v, vec![9, 3, 4, 5, 8, 0]);

        assert!(matches!(
            sort_range(&mut v, 4, 1, 2),
            Err(HubbleError::InvalidRange { .. })
        ));
        assert!(sort_range(&mut v, 2, 6, 2).is_err());
    }

    #[test]
    fn test_threshold_validation() {
        let mut v = vec![3, 2, 1];
        assert_eq!(
            sort(&mut v, 1),
            Err(HubbleError::InvalidThreshold {
                threshold: 1,
                len: 3
            })
        );
        assert!(sort(&mut v, 4).is_err());
        assert_eq!(v, vec![3, 2, 1]);

        let mut empty: Vec<i32> = Vec::new();
        assert!(sort(&mut empty, 2).is_err());
    }
}
