//! Bounded, observable FIFO ring buffer.
//!
//! ## Purpose
//!
//! This module provides [`RingBuffer`], a fixed-capacity FIFO shared between a
//! producing thread and a receiving thread. Every net change in size is
//! reported to registered [`SizeObserver`]s, which is how the pipeline learns
//! that space has freed up or that a batch is ready.
//!
//! ## Design notes
//!
//! * **Single lock**: Head, tail, count, storage and observers live behind one
//!   `Mutex`, so every public operation is linearizable.
//! * **Explicit count**: The element count is stored, not derived from head and
//!   tail, which removes the empty/full ambiguity.
//! * **Batched notification**: Multi-element operations suppress per-element
//!   notifications and fire at most once, and only if the size changed.
//! * **Boolean backpressure**: A full buffer rejects `add` with `false`.
//!
//! ## Key concepts
//!
//! * **Head**: physical slot of the oldest element.
//! * **Tail**: physical slot of the newest element.
//! * **Batch**: elements detached from the buffer by [`RingBuffer::take`].
//!
//! ## Invariants
//!
//! * `0 <= size() <= capacity()`.
//! * When non-empty, `tail == (head + size() - 1) % capacity()`.
//! * `take` returns the oldest elements in insertion order.
//!
//! ## Non-goals
//!
//! * Multiple concurrent readers: concurrent `take` calls race on the signaling protocol.
//! * Resizing: capacity is fixed at construction.

// External dependencies
use core::ops::{Deref, DerefMut};
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard};

// Internal dependencies
use crate::collections::observer::{ObserverRegistry, SizeObserver};
use crate::primitives::container::{ArrayContainer, IndexedContainer};
use crate::primitives::errors::{HubbleError, Result};
use crate::primitives::index::{decrement, increment};

// ============================================================================
// Batch
// ============================================================================

/// Owned run of elements detached from a [`RingBuffer`] in FIFO order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Batch<T>(Vec<T>);

impl<T> Batch<T> {
    /// Borrow the elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Mutably borrow the elements, e.g. to sort them in place.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.0
    }

    /// Consume the batch, returning its elements.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T> From<Vec<T>> for Batch<T> {
    fn from(v: Vec<T>) -> Self {
        Self(v)
    }
}

impl<T> Deref for Batch<T> {
    type Target = [T];
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Batch<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> IntoIterator for Batch<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ============================================================================
// Inner State
// ============================================================================

#[derive(Debug)]
struct Inner<T> {
    store: ArrayContainer<T>,
    head: usize,
    tail: usize,
    count: usize,
    observers: ObserverRegistry,
    suppress: bool,
}

impl<T: Clone + Default> Inner<T> {
    #[inline]
    fn capacity(&self) -> usize {
        self.store.len()
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Physical slot of the `offset`-th oldest element.
    #[inline]
    fn slot(&self, offset: usize) -> usize {
        (self.head + offset) % self.capacity()
    }

    fn size_changed(&mut self) {
        if !self.suppress {
            self.observers.notify(self.count);
        }
    }

    /// Run `action` with notifications suppressed, then fire once if the size moved.
    ///
    /// The flag is restored even if `action` unwinds.
    fn en_masse<R>(&mut self, action: impl FnOnce(&mut Self) -> R) -> R {
        let mut scope = Suppressed::enter(self);
        action(&mut *scope)
    }

    fn add(&mut self, item: T) -> core::result::Result<(), T> {
        if self.is_full() {
            return Err(item);
        }

        let cap = self.capacity();
        if self.count == 0 {
            self.tail = self.head;
        } else {
            self.tail = increment(self.tail, cap, 1);
            // The fullness check above keeps the tail off the head.
            debug_assert_ne!(self.tail, self.head);
        }

        self.store.set(self.tail, item);
        self.count += 1;
        self.size_changed();
        Ok(())
    }

    fn position(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        (0..self.count).find(|&offset| self.store.get(self.slot(offset)) == Some(item))
    }

    fn remove(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        let Some(found) = self.position(item) else {
            return false;
        };

        // Bubble the removed element to the tail so survivors keep their order.
        let mut previous = self.slot(found);
        for offset in (found + 1)..self.count {
            let current = self.slot(offset);
            self.store.swap(previous, current);
            previous = current;
        }

        self.store.set(self.tail, T::default());
        self.tail = decrement(self.tail, self.capacity());
        self.count -= 1;
        self.size_changed();
        true
    }

    fn snapshot(&self) -> Vec<T> {
        (0..self.count)
            .filter_map(|offset| self.store.get(self.slot(offset)).cloned())
            .collect()
    }

    fn take(&mut self, n: usize) -> Vec<T> {
        let clamped = n.min(self.count);
        let mut out = vec![T::default(); clamped];
        if clamped == 0 {
            return out;
        }

        // Vacated slots are left holding `T::default()`.
        let cap = self.capacity();
        let first = clamped.min(cap - self.head);
        self.store.swap_range(self.head, &mut out[..first]);
        if first < clamped {
            // The live range wraps: the rest starts at slot zero.
            self.store.swap_range(0, &mut out[first..]);
        }

        self.head = increment(self.head, cap, clamped);
        self.count -= clamped;
        out
    }

    fn clear(&mut self) {
        for offset in 0..self.count {
            let slot = self.slot(offset);
            self.store.set(slot, T::default());
        }
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }
}

/// Notification suppression scope opened by [`Inner::en_masse`].
///
/// Dropping it restores the previous flag and fires once if the size moved.
struct Suppressed<'a, T: Clone + Default> {
    inner: &'a mut Inner<T>,
    before: usize,
    outer: bool,
}

impl<'a, T: Clone + Default> Suppressed<'a, T> {
    fn enter(inner: &'a mut Inner<T>) -> Self {
        let before = inner.count;
        let outer = mem::replace(&mut inner.suppress, true);
        Self {
            inner,
            before,
            outer,
        }
    }
}

impl<T: Clone + Default> Deref for Suppressed<'_, T> {
    type Target = Inner<T>;
    fn deref(&self) -> &Self::Target {
        self.inner
    }
}

impl<T: Clone + Default> DerefMut for Suppressed<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner
    }
}

impl<T: Clone + Default> Drop for Suppressed<'_, T> {
    fn drop(&mut self) {
        self.inner.suppress = self.outer;
        if self.inner.count != self.before {
            self.inner.size_changed();
        }
    }
}

// ============================================================================
// RingBuffer
// ============================================================================

/// Fixed-capacity FIFO with size-change notification.
///
/// All methods take `&self`; share the buffer between threads with `Arc`.
#[derive(Debug)]
pub struct RingBuffer<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> RingBuffer<T> {
    // A panicking observer leaves the state consistent: it only runs after a
    // mutation has been committed.
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Register an observer to be told about every net size change.
    ///
    /// Only a weak reference is kept. The observer must not call back into this
    /// buffer from [`SizeObserver::size_changed`].
    pub fn register_observer<O: SizeObserver + 'static>(&self, observer: &Arc<O>) {
        self.lock().observers.register(observer);
    }

    /// Unregister an observer. Returns `true` if it was found.
    pub fn unregister_observer<O: SizeObserver + 'static>(&self, observer: &Arc<O>) -> bool {
        self.lock().observers.unregister(observer)
    }

    /// Number of registered observers, including dropped ones not yet pruned.
    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }
}

impl<T: Clone + Default> RingBuffer<T> {
    /// Create an empty buffer that holds at most `capacity` elements.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(HubbleError::InvalidCapacity(capacity));
        }

        Ok(Self {
            inner: Mutex::new(Inner {
                store: ArrayContainer::new(capacity),
                head: 0,
                tail: 0,
                count: 0,
                observers: ObserverRegistry::new(),
                suppress: false,
            }),
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Maximum number of elements.
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Current number of elements.
    pub fn size(&self) -> usize {
        self.lock().count
    }

    /// Number of free slots.
    pub fn remaining(&self) -> usize {
        let inner = self.lock();
        inner.capacity() - inner.count
    }

    /// Returns `true` if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.lock().count == 0
    }

    /// Returns `true` if `size() == capacity()`.
    pub fn is_full(&self) -> bool {
        self.lock().is_full()
    }

    /// Linear search for `item`.
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.lock().position(item).is_some()
    }

    /// Returns `true` if every element of `items` is present.
    ///
    /// An empty query is contained only by an empty buffer, and an empty
    /// buffer contains no non-empty query.
    pub fn contains_all(&self, items: &[T]) -> bool
    where
        T: PartialEq,
    {
        let inner = self.lock();
        match (items.is_empty(), inner.count == 0) {
            (true, true) => true,
            (true, false) | (false, true) => false,
            (false, false) => items.iter().all(|item| inner.position(item).is_some()),
        }
    }

    /// Copy the live elements, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.lock().snapshot()
    }

    /// Iterate over a snapshot of the live elements, oldest first.
    ///
    /// The snapshot is taken now; later mutations do not affect the iterator.
    pub fn iter(&self) -> Iter<T> {
        Iter {
            items: self.to_vec().into_iter(),
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Append `item`. Returns `false` without mutating if the buffer is full.
    pub fn add(&self, item: T) -> bool {
        self.lock().add(item).is_ok()
    }

    /// Append `item`, handing it back if the buffer is full.
    ///
    /// Lets a producer retry the same value after waiting for space.
    pub fn try_add(&self, item: T) -> core::result::Result<(), T> {
        self.lock().add(item)
    }

    /// Append every item in order.
    ///
    /// With `fail_if_insufficient_space`, nothing is added unless all items fit.
    /// Otherwise items are added until the buffer fills. Returns `true` if at
    /// least one item was added. Observers are notified at most once.
    pub fn add_all<I>(&self, items: I, fail_if_insufficient_space: bool) -> bool
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let items = items.into_iter();
        let mut inner = self.lock();

        if fail_if_insufficient_space && items.len() > inner.capacity() - inner.count {
            return false;
        }

        inner.en_masse(|inner| {
            let mut changed = false;
            for item in items {
                if inner.add(item).is_err() {
                    break;
                }
                changed = true;
            }
            changed
        })
    }

    /// Remove the first occurrence of `item`, shifting later elements toward the head.
    pub fn remove(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.lock().remove(item)
    }

    /// Remove the first occurrence of each element of `items`.
    ///
    /// Returns `true` if anything was removed. Observers are notified at most once.
    pub fn remove_all(&self, items: &[T]) -> bool
    where
        T: PartialEq,
    {
        self.lock().en_masse(|inner| {
            items
                .iter()
                .fold(false, |changed, item| inner.remove(item) || changed)
        })
    }

    /// Remove every element not present in `keep`, preserving the order of survivors.
    ///
    /// Returns `true` if anything was removed. Observers are notified at most once.
    pub fn retain_all(&self, keep: &[T]) -> bool
    where
        T: PartialEq,
    {
        self.lock().en_masse(|inner| {
            let discard: Vec<T> = inner
                .snapshot()
                .into_iter()
                .filter(|item| !keep.contains(item))
                .collect();

            discard
                .iter()
                .fold(false, |changed, item| inner.remove(item) || changed)
        })
    }

    /// Detach the oldest `n` elements (clamped to `[0, size()]`) as a [`Batch`].
    pub fn take(&self, n: usize) -> Batch<T> {
        Batch(self.lock().en_masse(|inner| inner.take(n)))
    }

    /// Remove every element.
    pub fn clear(&self) {
        self.lock().en_masse(Inner::clear);
    }
}

// ============================================================================
// Iteration
// ============================================================================

/// Snapshot iterator returned by [`RingBuffer::iter`].
#[derive(Debug, Clone)]
pub struct Iter<T> {
    items: std::vec::IntoIter<T>,
}

impl<T> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<T> {}

impl<T> DoubleEndedIterator for Iter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.items.next_back()
    }
}

impl<T: Clone + Default> IntoIterator for &RingBuffer<T> {
    type Item = T;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
