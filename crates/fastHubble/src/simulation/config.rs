//! Simulation configuration.
//!
//! A run is described by two exponents: `i` fixes the frame side `n = 2^i`,
//! and `j` fixes the sort cutoff `t = 10^j`. The receiver waits for one full
//! frame of `n²` readings on a buffer that can hold two frames.

// External dependencies
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// Internal dependencies
use crate::simulation::SimulationError;

/// Largest accepted side exponent.
pub const MAX_SIDE_EXPONENT: u32 = 15;

/// Largest accepted cutoff exponent.
pub const MAX_CUTOFF_EXPONENT: u32 = 9;

/// Parameters of one satellite run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Side exponent: frames are `2^i` pixels wide.
    pub i: u32,

    /// Cutoff exponent: the merge sort threshold is `10^j`.
    pub j: u32,

    /// Sort frames with the parallel pass.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Seed for reproducible sensor readings; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_parallel() -> bool {
    true
}

impl SimulationConfig {
    /// Create a validated configuration with parallel sorting and a random seed.
    pub fn new(i: u32, j: u32) -> Result<Self, SimulationError> {
        let config = Self {
            i,
            j,
            parallel: true,
            seed: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document such as `{"i": 4, "j": 1}`.
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SimulationError> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SimulationError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Check both exponents.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(1..=MAX_SIDE_EXPONENT).contains(&self.i) {
            return Err(SimulationError::InvalidConfig(format!(
                "i = {} must be between 1 and {MAX_SIDE_EXPONENT}",
                self.i
            )));
        }
        if self.j > MAX_CUTOFF_EXPONENT {
            return Err(SimulationError::InvalidConfig(format!(
                "j = {} must be between 0 and {MAX_CUTOFF_EXPONENT}",
                self.j
            )));
        }
        Ok(())
    }

    /// Frame side `n = 2^i`.
    pub fn side(&self) -> usize {
        1usize << self.i
    }

    /// Raw cutoff `t = 10^j`.
    pub fn cutoff(&self) -> usize {
        10usize.pow(self.j)
    }

    /// Readings per frame, `n²`; also the receiver threshold.
    pub fn threshold(&self) -> usize {
        self.side() * self.side()
    }

    /// Buffer capacity, `2·n²`.
    pub fn capacity(&self) -> usize {
        2 * self.threshold()
    }

    /// Effective sort threshold: `t` clamped to `[2, n²]`.
    pub fn sort_threshold(&self) -> usize {
        self.cutoff().clamp(2, self.threshold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_sizes() {
        let config = SimulationConfig::new(3, 1).unwrap();
        assert_eq!(config.side(), 8);
        assert_eq!(config.threshold(), 64);
        assert_eq!(config.capacity(), 128);
        assert_eq!(config.sort_threshold(), 10);
    }

    #[test]
    fn test_sort_threshold_clamped() {
        assert_eq!(SimulationConfig::new(1, 0).unwrap().sort_threshold(), 2);
        assert_eq!(SimulationConfig::new(2, 5).unwrap().sort_threshold(), 16);
    }
}
