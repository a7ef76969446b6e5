//! Input abstractions for parallel sorting.
//!
//! ## Purpose
//!
//! This module provides a unified abstraction for sort inputs, allowing the
//! parallel sorter to process multiple data formats (slices, vectors, ndarray)
//! through a single interface.
//!
//! ## Design notes
//!
//! * **In place**: Sorting works directly on the underlying buffer; nothing is copied.
//! * **Fail-fast validation**: Strided ndarray views are rejected before any element moves.
//!
//! ## Key concepts
//!
//! * **SortInput Trait**: Requires types to provide a contiguous mutable slice view.
//!
//! ## Invariants
//!
//! * Returned slices cover every element of the input container.
//!
//! ## Non-goals
//!
//! * This module does not reshape or copy multi-dimensional arrays.

// External dependencies
use ndarray::{ArrayBase, DataMut, Ix1};

// Export dependencies from hubble crate
use hubble::internals::primitives::errors::HubbleError;

/// Trait for containers that can be sorted in place.
pub trait SortInput<T> {
    /// Borrow the input as one contiguous mutable slice.
    fn as_sort_slice_mut(&mut self) -> Result<&mut [T], HubbleError>;
}

impl<T> SortInput<T> for [T] {
    fn as_sort_slice_mut(&mut self) -> Result<&mut [T], HubbleError> {
        Ok(self)
    }
}

impl<T> SortInput<T> for Vec<T> {
    fn as_sort_slice_mut(&mut self) -> Result<&mut [T], HubbleError> {
        Ok(self.as_mut_slice())
    }
}

impl<T, S> SortInput<T> for ArrayBase<S, Ix1>
where
    S: DataMut<Elem = T>,
{
    fn as_sort_slice_mut(&mut self) -> Result<&mut [T], HubbleError> {
        self.as_slice_mut().ok_or_else(|| {
            HubbleError::InvalidArgument("ndarray input must be contiguous in memory".to_string())
        })
    }
}
