#![cfg(feature = "dev")]
//! Tests for the satellite simulation.
//!
//! These tests verify the simulation layer for:
//! - Configuration parsing and validation
//! - Linear normalisation of readings to gray levels
//! - Column-major frame layout
//! - Complete runs on small frames
//!
//! ## Test Organization
//!
//! 1. **Configuration** - JSON parsing, defaults, bounds
//! 2. **Normalisation** - Intensity and gray level mapping
//! 3. **Frames** - Layout and size checks
//! 4. **Runs** - End-to-end simulation

use std::io::Cursor;

use approx::assert_relative_eq;

use fastHubble::internals::simulation::frame::intensity;
use fastHubble::prelude::*;

// ============================================================================
// Configuration Tests
// ============================================================================

/// Test parsing with defaults for the optional fields.
#[test]
fn test_config_from_json_defaults() {
    let config = SimulationConfig::from_json(r#"{"i": 5, "j": 2}"#).unwrap();

    assert_eq!(config.side(), 32);
    assert_eq!(config.cutoff(), 100);
    assert_eq!(config.threshold(), 1024);
    assert_eq!(config.capacity(), 2048);
    assert!(config.parallel);
    assert_eq!(config.seed, None);
}

/// Test parsing every field from a reader.
#[test]
fn test_config_from_reader() {
    let json = r#"{"i": 2, "j": 0, "parallel": false, "seed": 11}"#;
    let config = SimulationConfig::from_reader(Cursor::new(json)).unwrap();

    assert!(!config.parallel);
    assert_eq!(config.seed, Some(11));
    assert_eq!(config.sort_threshold(), 2);
}

/// Test rejected configurations.
#[test]
fn test_config_validation() {
    assert!(matches!(
        SimulationConfig::from_json(r#"{"i": 0, "j": 1}"#),
        Err(SimulationError::InvalidConfig(_))
    ));
    assert!(matches!(
        SimulationConfig::new(16, 1),
        Err(SimulationError::InvalidConfig(_))
    ));
    assert!(matches!(
        SimulationConfig::new(3, 10),
        Err(SimulationError::InvalidConfig(_))
    ));
    assert!(matches!(
        SimulationConfig::from_json(r#"{"i": 3}"#),
        Err(SimulationError::Config(_))
    ));
    assert!(matches!(
        SimulationConfig::from_path("/nonexistent/hubble/config.json"),
        Err(SimulationError::Io(_))
    ));
}

// ============================================================================
// Normalisation Tests
// ============================================================================

/// Test the intensity of representative readings.
#[test]
fn test_intensity_is_linear() {
    assert_relative_eq!(intensity(i32::MIN), 0.0);
    assert_relative_eq!(intensity(i32::MAX), 1.0);
    assert_relative_eq!(intensity(0i32), 0.5, epsilon = 1e-9);
    assert_relative_eq!(intensity(64u8), 64.0 / 255.0, epsilon = 1e-12);
    assert_relative_eq!(intensity(-64i8), 64.0 / 255.0, epsilon = 1e-12);
}

/// Test that gray levels are monotone in the reading.
#[test]
fn test_normalize_monotone() {
    let readings = [i16::MIN, -1000, -1, 0, 1, 1000, i16::MAX];
    let levels: Vec<u8> = readings.iter().map(|&r| normalize(r)).collect();

    assert_eq!(levels.first(), Some(&0));
    assert_eq!(levels.last(), Some(&255));
    assert!(levels.windows(2).all(|w| w[0] <= w[1]));
}

// ============================================================================
// Frame Tests
// ============================================================================

/// Test that sorted readings produce columns that brighten left to right.
#[test]
fn test_frame_from_sorted_columns() {
    let side = 4;
    let readings: Vec<u8> = (0..16).map(|v| v * 16).collect();
    let frame = GrayscaleFrame::from_columns(side, &readings).unwrap();

    for x in 0..side {
        for y in 0..side {
            assert_eq!(frame.pixel(x, y), Some(readings[x * side + y]));
        }
    }
    assert!(frame.pixel(0, 3) < frame.pixel(1, 0));
    assert_relative_eq!(frame.mean_intensity(), 120.0 / 255.0, epsilon = 1e-12);
}

/// Test that the reading count must match the frame.
#[test]
fn test_frame_size_mismatch() {
    assert!(GrayscaleFrame::from_columns(3, &[1i32; 8]).is_err());
    assert!(GrayscaleFrame::from_columns(0, &[0i32; 0]).is_err());
}

// ============================================================================
// Run Tests
// ============================================================================

/// Test a seeded run end to end.
///
/// Verifies the frame size and that pixels are non-decreasing in column-major
/// order, which follows from sorting before rendering.
#[test]
fn test_seeded_run() {
    let config = SimulationConfig::from_json(r#"{"i": 3, "j": 1, "seed": 5}"#).unwrap();
    let report = Simulation::new(config).unwrap().run().unwrap();

    let frame = &report.frame;
    assert_eq!(frame.side(), 8);
    assert!(report.produced >= 64);

    let column_major: Vec<u8> = (0..8)
        .flat_map(|x| (0..8).map(move |y| (x, y)))
        .filter_map(|(x, y)| frame.pixel(x, y))
        .collect();
    assert_eq!(column_major.len(), 64);
    assert!(column_major.windows(2).all(|w| w[0] <= w[1]));
    assert!(report.to_string().contains("Summary:"));
}

/// Test that parallel and sequential runs render the same frame.
#[test]
fn test_parallel_and_sequential_runs_agree() {
    let parallel = SimulationConfig::from_json(r#"{"i": 4, "j": 0, "seed": 9}"#).unwrap();
    let sequential = SimulationConfig {
        parallel: false,
        ..parallel
    };

    let a = Simulation::new(parallel).unwrap().run().unwrap();
    let b = Simulation::new(sequential).unwrap().run().unwrap();
    assert_eq!(a.frame, b.frame);
}
