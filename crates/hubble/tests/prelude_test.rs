//! Tests for the prelude module.
//!
//! These tests verify that the prelude exports everything needed to build a
//! buffer, wire a producer and receiver by hand, and run a pipeline without
//! any other import.
//!
//! ## Test Organization
//!
//! 1. **Import Verification** - All prelude exports are accessible
//! 2. **Manual Wiring** - Components assembled without the builder

use std::sync::Arc;
use std::thread;

use hubble::prelude::*;

// ============================================================================
// Import Verification Tests
// ============================================================================

/// Test that the builder and mode variants are usable unqualified.
#[test]
fn test_prelude_imports() {
    for mode in [OneShot, Repeat(2), Continuous, ReceiveMode::default()] {
        let pipeline = Pipeline::<i32>::new().threshold(4).mode(mode).build();
        assert!(pipeline.is_ok(), "mode {mode:?} should build");
    }
}

/// Test that the sorting and merging functions are exported.
#[test]
fn test_prelude_algorithms() {
    let mut values = vec![4, 1, 3, 2];
    sort(&mut values, 2).unwrap();
    assert_eq!(values, vec![1, 2, 3, 4]);

    let mut words = vec!["pear", "fig", "apple"];
    sort_by_key(&mut words, 2, |w| w.len()).unwrap();
    assert_eq!(words, vec!["fig", "pear", "apple"]);

    assert_eq!(merge(&[1, 3], &[2]), vec![1, 2, 3]);
    assert_eq!(merge_all(vec![vec![2], vec![1]]), vec![1, 2]);
}

// ============================================================================
// Manual Wiring Tests
// ============================================================================

/// Test a producer, receiver and processor wired together by hand.
///
/// Verifies the same flow the builder sets up.
#[test]
fn test_manual_wiring() {
    let buffer = Arc::new(RingBuffer::<i32>::new(8).unwrap());
    let processor = Arc::new(SortingProcessor::new(2, |s: &[i32]| s.len()).unwrap());

    let mut receiver = Receiver::new(Arc::clone(&buffer), Arc::clone(&processor), 4)
        .unwrap()
        .with_mode(Repeat(2));
    let mut producer = Producer::new(Arc::clone(&buffer), RandomSource::seeded(5));
    let stop: StopHandle = producer.stop_handle();

    let producing = thread::spawn(move || producer.run());
    assert_eq!(receiver.run(), Ok(2));
    assert_eq!(receiver.state(), ReceiverState::Done);

    stop.stop();
    assert!(producing.join().unwrap() >= 8);
    processor.join();
    assert_eq!(processor.take_outputs().len(), 2);
}
