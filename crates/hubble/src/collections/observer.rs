//! Size-change observers.
//!
//! ## Purpose
//!
//! This module provides the callback interface a ring buffer uses to report
//! changes in its size, and the ordered registry that holds those callbacks.
//!
//! ## Design notes
//!
//! * **Weak references**: The registry holds `Weak` handles. An observer may be
//!   dropped at any time; dead entries are pruned on the next notification.
//! * **Identity**: Observers are matched by pointer identity, not by value.
//! * **Synchronous**: Callbacks run on the mutating thread, in registration order.
//!
//! ## Invariants
//!
//! * An observer appears at most once in a registry.
//!
//! ## Non-goals
//!
//! * Observers cannot veto or alter a mutation; they only learn the new size.

// External dependencies
use std::fmt;
use std::sync::{Arc, Weak};

// ============================================================================
// SizeObserver Trait
// ============================================================================

/// Callback invoked after a buffer mutation changes the number of stored elements.
///
/// Callbacks run while the buffer's internal lock is held. An observer must not
/// call back into the buffer that notified it; doing so deadlocks.
pub trait SizeObserver: Send + Sync {
    /// Called with the buffer's new size.
    fn size_changed(&self, size: usize);
}

impl<F> SizeObserver for F
where
    F: Fn(usize) + Send + Sync,
{
    fn size_changed(&self, size: usize) {
        self(size)
    }
}

// ============================================================================
// ObserverRegistry
// ============================================================================

/// Ordered set of weakly held [`SizeObserver`]s.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<Weak<dyn SizeObserver>>,
}

#[inline]
fn address<O: ?Sized>(ptr: *const O) -> *const () {
    ptr as *const ()
}

impl ObserverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `observer` at the end of the notification order.
    ///
    /// Registering the same observer twice has no effect.
    pub fn register<O: SizeObserver + 'static>(&mut self, observer: &Arc<O>) {
        let target = address(Arc::as_ptr(observer));
        if self
            .observers
            .iter()
            .any(|weak| address(weak.as_ptr()) == target)
        {
            return;
        }

        let weak: Weak<O> = Arc::downgrade(observer);
        self.observers.push(weak);
    }

    /// Remove `observer`. Returns `true` if it was registered.
    pub fn unregister<O: SizeObserver + 'static>(&mut self, observer: &Arc<O>) -> bool {
        let target = address(Arc::as_ptr(observer));
        match self
            .observers
            .iter()
            .position(|weak| address(weak.as_ptr()) == target)
        {
            Some(pos) => {
                self.observers.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Invoke every live observer with `size`, pruning dropped ones.
    pub fn notify(&mut self, size: usize) {
        self.observers.retain(|weak| match weak.upgrade() {
            Some(observer) => {
                observer.size_changed(size);
                true
            }
            None => false,
        });
    }

    /// Number of registered entries, including ones not yet pruned.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns `true` if no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_notify_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = {
            let log = Arc::clone(&log);
            Arc::new(move |size: usize| log.lock().unwrap().push(("first", size)))
        };
        let second = {
            let log = Arc::clone(&log);
            Arc::new(move |size: usize| log.lock().unwrap().push(("second", size)))
        };

        let mut registry = ObserverRegistry::new();
        registry.register(&first);
        registry.register(&second);
        registry.notify(3);

        assert_eq!(*log.lock().unwrap(), vec![("first", 3), ("second", 3)]);
    }

    #[test]
    fn test_register_is_idempotent() {
        let hits = Arc::new(AtomicUsize::new(0));
        let observer = {
            let hits = Arc::clone(&hits);
            Arc::new(move |_: usize| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        let mut registry = ObserverRegistry::new();
        registry.register(&observer);
        registry.register(&observer);
        registry.notify(1);

        assert_eq!(registry.len(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregister() {
        let observer = Arc::new(|_: usize| {});
        let other = Arc::new(|_: usize| {});

        let mut registry = ObserverRegistry::new();
        registry.register(&observer);

        assert!(!registry.unregister(&other));
        assert!(registry.unregister(&observer));
        assert!(!registry.unregister(&observer));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_dropped_observers_are_pruned() {
        let mut registry = ObserverRegistry::new();
        {
            let observer = Arc::new(|_: usize| {});
            registry.register(&observer);
        }
        assert_eq!(registry.len(), 1);

        registry.notify(0);
        assert!(registry.is_empty());
    }
}
