#![cfg(feature = "dev")]
//! Tests for the bounded ring buffer.
//!
//! These tests verify the ring buffer used by the pipeline for:
//! - FIFO ordering across wrap-around
//! - Capacity limits and all-or-nothing batch insertion
//! - Removal, retention and containment queries
//! - Size-change notification, including batched suppression
//!
//! ## Test Organization
//!
//! 1. **Basic Operations** - Construction, add, take, clear
//! 2. **Batch Operations** - add_all, remove_all, retain_all
//! 3. **Queries** - contains, contains_all, iteration snapshots
//! 4. **Observers** - Notification counts, weak references
//! 5. **Concurrency** - Single producer / single receiver FIFO

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hubble::internals::collections::ring_buffer::RingBuffer;
use hubble::internals::primitives::errors::HubbleError;

/// Observer that records every size it is told about.
fn recorder() -> (Arc<impl Fn(usize) + Send + Sync>, Arc<Mutex<Vec<usize>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    (Arc::new(move |size| sink.lock().unwrap().push(size)), log)
}

// ============================================================================
// Basic Operation Tests
// ============================================================================

/// Test the canonical capacity-four scenario.
///
/// Verifies fullness, rejection, partial take and wrap-around iteration.
#[test]
fn test_capacity_four_scenario() {
    let rb = RingBuffer::new(4).unwrap();
    for value in 1..=4 {
        assert!(rb.add(value), "add({value}) should succeed");
    }
    assert!(rb.is_full());
    assert!(!rb.add(5), "add on a full buffer must fail");

    assert_eq!(rb.take(2).as_slice(), &[1, 2]);
    assert_eq!(rb.size(), 2);

    assert!(rb.add(5));
    assert!(rb.add(6));
    assert_eq!(rb.iter().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
}

/// Test that a zero capacity is rejected.
#[test]
fn test_zero_capacity_rejected() {
    assert_eq!(
        RingBuffer::<i32>::new(0).unwrap_err(),
        HubbleError::InvalidCapacity(0)
    );
}

/// Test that take clamps to the current size.
///
/// Verifies `take(size + 5)` returns everything and empties the buffer.
#[test]
fn test_take_clamps_to_size() {
    let rb = RingBuffer::new(8).unwrap();
    rb.add_all([1, 2, 3], true);

    let size = rb.size();
    let batch = rb.take(size + 5);

    assert_eq!(batch.len(), size);
    assert_eq!(batch.into_vec(), vec![1, 2, 3]);
    assert!(rb.is_empty());
    assert!(rb.take(4).is_empty());
}

/// Test that a rejected value is handed back.
#[test]
fn test_try_add_returns_rejected_value() {
    let rb = RingBuffer::new(1).unwrap();
    assert_eq!(rb.try_add(String::from("a")), Ok(()));
    assert_eq!(rb.try_add(String::from("b")), Err(String::from("b")));
}

/// Test clearing and reusing the buffer.
#[test]
fn test_clear_and_reuse() {
    let rb = RingBuffer::new(3).unwrap();
    rb.add_all([1, 2, 3], true);
    rb.take(1);
    rb.clear();

    assert!(rb.is_empty());
    assert_eq!(rb.remaining(), 3);
    assert!(rb.add_all([7, 8, 9], true));
    assert_eq!(rb.to_vec(), vec![7, 8, 9]);
}

/// Test that the size invariant holds across random operations.
///
/// Verifies `0 <= size <= capacity` and agreement with a reference deque.
#[test]
fn test_size_invariant_random_operations() {
    let mut rng = StdRng::seed_from_u64(42);
    let rb = RingBuffer::new(7).unwrap();
    let mut model = std::collections::VecDeque::new();

    for step in 0..2_000 {
        match rng.random_range(0..4) {
            0 | 1 => {
                let value = step;
                let added = rb.add(value);
                assert_eq!(added, model.len() < 7);
                if added {
                    model.push_back(value);
                }
            }
            2 => {
                let n = rng.random_range(0..10);
                let expected: Vec<_> = model.drain(..n.min(model.len())).collect();
                assert_eq!(rb.take(n).into_vec(), expected);
            }
            _ => {
                if let Some(&victim) = model.get(model.len() / 2) {
                    assert!(rb.remove(&victim));
                    model.retain(|&v| v != victim);
                }
            }
        }

        assert!(rb.size() <= rb.capacity());
        assert_eq!(rb.to_vec(), model.iter().copied().collect::<Vec<_>>());
    }
}

// ============================================================================
// Batch Operation Tests
// ============================================================================

/// Test all-or-nothing insertion.
///
/// Verifies a buffer with two free slots is untouched by a three-item request.
#[test]
fn test_add_all_all_or_nothing() {
    let rb = RingBuffer::new(4).unwrap();
    rb.add_all([1, 2], true);
    let before = rb.to_vec();

    assert!(!rb.add_all([3, 4, 5], true));
    assert_eq!(rb.to_vec(), before);
    assert_eq!(rb.size(), 2);
}

/// Test partial insertion when space is insufficient.
#[test]
fn test_add_all_partial_fill() {
    let rb = RingBuffer::new(4).unwrap();
    rb.add_all([1, 2, 3], true);

    assert!(rb.add_all([4, 5, 6], false));
    assert_eq!(rb.to_vec(), vec![1, 2, 3, 4]);

    // Nothing fits: no element added, so the call reports false.
    assert!(!rb.add_all([7], false));
}

/// Test removal compacts survivors in order.
#[test]
fn test_remove_preserves_order() {
    let rb = RingBuffer::new(5).unwrap();
    rb.add_all([1, 2, 3], true);
    rb.take(2);
    rb.add_all([4, 5, 6, 7], true);

    // Live range wraps: [3, 4, 5, 6, 7].
    assert!(rb.remove(&5));
    assert!(!rb.remove(&5));
    assert_eq!(rb.to_vec(), vec![3, 4, 6, 7]);

    assert!(rb.add(8));
    assert_eq!(rb.to_vec(), vec![3, 4, 6, 7, 8]);
}

/// Test remove_all removes the first occurrence of each query element.
#[test]
fn test_remove_all() {
    let rb = RingBuffer::new(6).unwrap();
    rb.add_all([1, 2, 1, 3, 2], true);

    assert!(rb.remove_all(&[1, 2, 9]));
    assert_eq!(rb.to_vec(), vec![1, 3, 2]);
    assert!(!rb.remove_all(&[9]));
}

/// Test retain_all keeps only listed elements.
#[test]
fn test_retain_all() {
    let rb = RingBuffer::new(6).unwrap();
    rb.add_all([5, 1, 5, 2, 3], true);

    assert!(rb.retain_all(&[5, 3]));
    assert_eq!(rb.to_vec(), vec![5, 5, 3]);
    assert!(!rb.retain_all(&[5, 3]));
}

// ============================================================================
// Query Tests
// ============================================================================

/// Test containment rules including the empty cases.
#[test]
fn test_contains_all_empty_rules() {
    let rb = RingBuffer::<i32>::new(3).unwrap();
    assert!(rb.contains_all(&[]), "empty buffer contains the empty set");
    assert!(!rb.contains_all(&[1]));

    rb.add_all([1, 2], true);
    assert!(!rb.contains_all(&[]), "non-empty buffer does not contain the empty set");
    assert!(rb.contains_all(&[2, 1]));
    assert!(!rb.contains_all(&[1, 3]));
    assert!(rb.contains(&2));
    assert!(!rb.contains(&3));
}

/// Test that iteration works on a snapshot.
///
/// Verifies later mutations do not affect an in-flight iterator.
#[test]
fn test_iter_is_a_snapshot() {
    let rb = RingBuffer::new(4).unwrap();
    rb.add_all([1, 2, 3], true);

    let mut iter = rb.iter();
    assert_eq!(iter.next(), Some(1));
    rb.clear();
    assert_eq!(iter.collect::<Vec<_>>(), vec![2, 3]);

    rb.add(9);
    let again: Vec<_> = (&rb).into_iter().rev().collect();
    assert_eq!(again, vec![9]);
}

// ============================================================================
// Observer Tests
// ============================================================================

/// Test single-element operations notify each time.
#[test]
fn test_observer_sees_every_change() {
    let rb = RingBuffer::new(2).unwrap();
    let (observer, log) = recorder();
    rb.register_observer(&observer);

    rb.add(1);
    rb.add(2);
    rb.add(3); // rejected, no notification
    rb.remove(&1);
    rb.remove(&42); // absent, no notification

    assert_eq!(*log.lock().unwrap(), vec![1, 2, 1]);
}

/// Test batched operations fire at most once.
///
/// Verifies suppression during add_all, remove_all, retain_all, take and clear.
#[test]
fn test_batched_operations_notify_once() {
    let rb = RingBuffer::new(8).unwrap();
    let (observer, log) = recorder();
    rb.register_observer(&observer);

    rb.add_all([1, 2, 3, 4, 5], true);
    rb.remove_all(&[1, 2]);
    rb.retain_all(&[3, 4]);
    rb.take(1);
    rb.take(0); // no change, no notification
    rb.clear();
    rb.clear(); // already empty, no notification

    assert_eq!(*log.lock().unwrap(), vec![5, 3, 2, 1, 0]);
}

/// Test unregistering and dropping observers.
#[test]
fn test_observer_lifecycle() {
    let rb = RingBuffer::new(4).unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = {
        let hits = Arc::clone(&hits);
        Arc::new(move |_: usize| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    };

    rb.register_observer(&counter);
    rb.add(1);
    assert!(rb.unregister_observer(&counter));
    rb.add(2);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // A dropped observer is pruned on the next notification.
    rb.register_observer(&counter);
    drop(counter);
    assert_eq!(rb.observer_count(), 1);
    rb.add(3);
    assert_eq!(rb.observer_count(), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Concurrency Tests
// ============================================================================

/// Test FIFO delivery between one producer and one receiver thread.
///
/// Verifies the concatenation of all batches equals the produced sequence.
#[test]
fn test_fifo_single_producer_single_receiver() {
    const TOTAL: u32 = 10_000;
    let rb = Arc::new(RingBuffer::new(64).unwrap());

    let producer = {
        let rb = Arc::clone(&rb);
        thread::spawn(move || {
            for value in 0..TOTAL {
                while !rb.add(value) {
                    thread::yield_now();
                }
            }
        })
    };

    let mut received = Vec::with_capacity(TOTAL as usize);
    while received.len() < TOTAL as usize {
        received.extend(rb.take(16));
        thread::yield_now();
    }
    producer.join().unwrap();

    assert_eq!(received, (0..TOTAL).collect::<Vec<_>>());
}
