//! Wrap-around index arithmetic for fixed-length backing stores.
//!
//! ## Purpose
//!
//! Ring buffers and range-based sorts address their storage through inclusive
//! `[start, end]` ranges and indices that wrap at the store length. The helpers
//! here keep every computed index inside `[0, len)`.
//!
//! ## Invariants
//!
//! * For `len > 0` and `index < len`, `increment` and `decrement` return a value in `[0, len)`.
//! * `increment` never advances by more than one full lap.

// Internal dependencies
use crate::primitives::errors::{HubbleError, Result};

/// Advance `index` by `amount` positions, wrapping at `len`.
///
/// `amount` is clamped to `[0, len]`, so the result is at most one lap away.
#[inline]
pub fn increment(index: usize, len: usize, amount: usize) -> usize {
    debug_assert!(len > 0 && index < len);
    (index + amount.min(len)) % len
}

/// Step `index` back by one position, wrapping at `len`.
#[inline]
pub fn decrement(index: usize, len: usize) -> usize {
    debug_assert!(len > 0 && index < len);
    (index + len - 1) % len
}

/// Length of the inclusive sub-range `[start, end]` of a store of length `len`.
///
/// The degenerate `(0, 0, 0)` case is accepted and yields zero.
pub fn span_len(start: usize, end: usize, len: usize) -> Result<usize> {
    if start == 0 && end == 0 && len == 0 {
        return Ok(0);
    }

    if end < start || start >= len || end >= len {
        return Err(HubbleError::InvalidRange { start, end, len });
    }

    Ok(end - start + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_wraps() {
        assert_eq!(increment(3, 4, 1), 0);
        assert_eq!(increment(1, 4, 2), 3);
        assert_eq!(increment(2, 4, 4), 2);
    }

    #[test]
    fn test_increment_clamps_amount() {
        // Ten steps on a store of four is clamped to a single lap.
        assert_eq!(increment(1, 4, 10), 1);
    }

    #[test]
    fn test_decrement_wraps() {
        assert_eq!(decrement(0, 4), 3);
        assert_eq!(decrement(3, 4), 2);
        assert_eq!(decrement(0, 1), 0);
    }

    #[test]
    fn test_span_len() {
        assert_eq!(span_len(0, 0, 0), Ok(0));
        assert_eq!(span_len(0, 3, 4), Ok(4));
        assert_eq!(span_len(2, 2, 4), Ok(1));
        assert_eq!(
            span_len(3, 1, 4),
            Err(HubbleError::InvalidRange {
                start: 3,
                end: 1,
                len: 4
            })
        );
        assert!(span_len(0, 4, 4).is_err());
    }
}
