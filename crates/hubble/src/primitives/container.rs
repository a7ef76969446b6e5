//! Fixed-length indexed backing stores.
//!
//! ## Purpose
//!
//! This module provides the storage abstraction underneath the ring buffer:
//! a container of fixed length addressed by index, with swap and ranged
//! copy-out operations.
//!
//! ## Design notes
//!
//! * **Fixed length**: Containers never grow or shrink after construction.
//! * **Slice semantics**: Out-of-range indices panic, exactly like slice indexing.
//! * **Copy-out**: Ranged copies clone into a caller-provided destination, so the
//!   container keeps ownership of its slots.
//! * **Move-out**: Ranged swaps exchange slots with a caller-provided
//!   destination, so a slot can be emptied without cloning its element.
//!
//! ## Invariants
//!
//! * `len()` is constant for the lifetime of a container.
//!
//! ## Non-goals
//!
//! * This module does not track which slots are "live"; the ring buffer does.

// External dependencies
use core::ops::{Deref, DerefMut};
use std::mem;

// ============================================================================
// IndexedContainer Trait
// ============================================================================

/// A fixed-length store addressed by index.
///
/// Mutating accessors follow slice semantics and panic on an out-of-range
/// index; callers own the index arithmetic.
pub trait IndexedContainer<T> {
    /// Number of slots in the store.
    fn len(&self) -> usize;

    /// Returns `true` if the store has no slots.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the element at `index`.
    fn get(&self, index: usize) -> Option<&T>;

    /// Overwrite the slot at `index`, returning the previous element.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    fn set(&mut self, index: usize, item: T) -> T;

    /// Exchange the elements at `a` and `b`.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    fn swap(&mut self, a: usize, b: usize);

    /// Clone `dest.len()` elements starting at `start` into `dest`.
    ///
    /// # Panics
    /// Panics if `start + dest.len() > len()`.
    fn copy_range(&self, start: usize, dest: &mut [T])
    where
        T: Clone;

    /// Exchange `dest.len()` slots starting at `start` with the contents of `dest`.
    ///
    /// # Panics
    /// Panics if `start + dest.len() > len()`.
    fn swap_range(&mut self, start: usize, dest: &mut [T]);

    /// Clone every slot into a new vector.
    fn to_vec(&self) -> Vec<T>
    where
        T: Clone;
}

// ============================================================================
// ArrayContainer
// ============================================================================

/// Boxed-slice implementation of [`IndexedContainer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayContainer<T>(Box<[T]>);

impl<T: Default + Clone> ArrayContainer<T> {
    /// Create a container of `len` default-initialized slots.
    pub fn new(len: usize) -> Self {
        Self(vec![T::default(); len].into_boxed_slice())
    }
}

impl<T> IndexedContainer<T> for ArrayContainer<T> {
    #[inline]
    fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&T> {
        self.0.get(index)
    }

    #[inline]
    fn set(&mut self, index: usize, item: T) -> T {
        mem::replace(&mut self.0[index], item)
    }

    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        self.0.swap(a, b);
    }

    fn copy_range(&self, start: usize, dest: &mut [T])
    where
        T: Clone,
    {
        dest.clone_from_slice(&self.0[start..start + dest.len()]);
    }

    fn swap_range(&mut self, start: usize, dest: &mut [T]) {
        dest.swap_with_slice(&mut self.0[start..start + dest.len()]);
    }

    fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.0.to_vec()
    }
}

impl<T> From<Vec<T>> for ArrayContainer<T> {
    fn from(v: Vec<T>) -> Self {
        Self(v.into_boxed_slice())
    }
}

impl<T> Deref for ArrayContainer<T> {
    type Target = [T];
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for ArrayContainer<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
