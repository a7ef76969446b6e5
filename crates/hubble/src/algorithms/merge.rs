//! Merging of independently sorted sequences.
//!
//! ## Purpose
//!
//! Batches sorted on different workers (or different machines) are reduced to a
//! single ordered sequence with the same merge step the sort uses internally.
//! These functions are usable on their own, outside any pipeline.
//!
//! ## Design notes
//!
//! * **Stable**: On ties the element from the earlier input comes first.
//! * **Pairwise reduction**: [`merge_all`] merges neighbouring partitions level
//!   by level, so each element is copied `O(log k)` times for `k` partitions.
//!
//! ## Invariants
//!
//! * Inputs are assumed sorted under the same ordering; this is not checked.

// External dependencies
use core::cmp::Ordering;

// Internal dependencies
use crate::algorithms::merge_sort::merge_into;

/// Merge two ascending sequences into one.
pub fn merge<T: Ord + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    merge_by(a, b, T::cmp)
}

/// Merge two sequences sorted under `compare`.
pub fn merge_by<T, F>(a: &[T], b: &[T], compare: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let mut out = Vec::with_capacity(a.len() + b.len());
    merge_into(a, b, &compare, &mut out);
    out
}

/// Merge two sequences sorted by the key extracted with `key`.
pub fn merge_by_key<T, K, F>(a: &[T], b: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    merge_by(a, b, |x, y| key(x).cmp(&key(y)))
}

/// Reduce sorted partitions to one ascending sequence.
///
/// Earlier partitions win ties against later ones.
pub fn merge_all<T: Ord + Clone>(partitions: Vec<Vec<T>>) -> Vec<T> {
    let mut level = partitions;
    if level.is_empty() {
        return Vec::new();
    }

    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut parts = level.into_iter();
        while let Some(left) = parts.next() {
            match parts.next() {
                Some(right) => next.push(merge(&left, &right)),
                None => next.push(left),
            }
        }
        level = next;
    }

    level.pop().unwrap_or_default()
}

/// Returns `true` if `slice` is non-decreasing under `compare`.
pub fn is_sorted_by<T, F>(slice: &[T], compare: F) -> bool
where
    F: Fn(&T, &T) -> Ordering,
{
    slice
        .windows(2)
        .all(|w| compare(&w[0], &w[1]) != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_all_odd_partition_count() {
        let merged = merge_all(vec![vec![1, 4, 7], vec![2, 5], vec![0, 3, 6, 8]]);
        assert_eq!(merged, (0..=8).collect::<Vec<_>>());
    }

    #[test]
    fn test_merge_all_edge_cases() {
        assert!(merge_all::<i32>(Vec::new()).is_empty());
        assert_eq!(merge_all(vec![vec![3, 9]]), vec![3, 9]);
        assert_eq!(merge_all(vec![Vec::new(), vec![1], Vec::new()]), vec![1]);
    }

    #[test]
    fn test_is_sorted_by() {
        assert!(is_sorted_by(&[1, 1, 2], i32::cmp));
        assert!(!is_sorted_by(&[2, 1], i32::cmp));
        assert!(is_sorted_by::<i32, _>(&[], i32::cmp));
    }
}
