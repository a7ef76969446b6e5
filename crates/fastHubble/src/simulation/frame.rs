//! Grayscale frames built from sorted sensor readings.
//!
//! Readings are mapped linearly from the full range of their integer type
//! onto `0..=255`. A frame of side `n` consumes `n²` readings column by
//! column: reading `x·n + y` becomes the pixel at column `x`, row `y`.

// External dependencies
use num_traits::PrimInt;
use std::fmt::{self, Display, Formatter};

// Internal dependencies
use crate::simulation::SimulationError;

// ============================================================================
// Normalisation
// ============================================================================

/// Position of `value` within its type's range, in `[0, 1]`.
pub fn intensity<T: PrimInt>(value: T) -> f64 {
    let min = T::min_value().to_f64().unwrap_or_default();
    let max = T::max_value().to_f64().unwrap_or_default();
    let value = value.to_f64().unwrap_or_default();
    (value - min) / (max - min)
}

/// Map `value` onto a gray level; the type's minimum is black, its maximum white.
pub fn normalize<T: PrimInt>(value: T) -> u8 {
    (intensity(value) * 255.0).round() as u8
}

// ============================================================================
// Frame
// ============================================================================

/// Square 8-bit grayscale image, stored row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleFrame {
    side: usize,
    pixels: Vec<u8>,
}

impl GrayscaleFrame {
    /// Build a frame from `side²` readings laid out column by column.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidConfig`] if the reading count is not `side²`.
    pub fn from_columns<T: PrimInt>(side: usize, readings: &[T]) -> Result<Self, SimulationError> {
        if side == 0 || readings.len() != side * side {
            return Err(SimulationError::InvalidConfig(format!(
                "a frame of side {side} needs {} readings (got {})",
                side * side,
                readings.len()
            )));
        }

        let mut pixels = vec![0u8; readings.len()];
        for (index, &reading) in readings.iter().enumerate() {
            let (x, y) = (index / side, index % side);
            pixels[y * side + x] = normalize(reading);
        }
        Ok(Self { side, pixels })
    }

    /// Width and height in pixels.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Row-major gray levels.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Gray level at column `x`, row `y`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.side || y >= self.side {
            return None;
        }
        self.pixels.get(y * self.side + x).copied()
    }

    /// Mean gray level scaled to `[0, 1]`.
    pub fn mean_intensity(&self) -> f64 {
        let total: u64 = self.pixels.iter().map(|&p| u64::from(p)).sum();
        total as f64 / (self.pixels.len() as f64 * 255.0)
    }
}

impl Display for GrayscaleFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} frame, mean intensity {:.4}",
            self.side,
            self.side,
            self.mean_intensity()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extremes() {
        assert_eq!(normalize(i32::MIN), 0);
        assert_eq!(normalize(i32::MAX), 255);
        assert_eq!(normalize(0u8), 0);
        assert_eq!(normalize(200u8), 200);
    }

    #[test]
    fn test_column_major_fill() {
        let frame = GrayscaleFrame::from_columns(2, &[0u8, 1, 2, 3]).unwrap();
        // Readings 0 and 1 fill column 0.
        assert_eq!(frame.pixel(0, 0), Some(0));
        assert_eq!(frame.pixel(0, 1), Some(1));
        assert_eq!(frame.pixel(1, 0), Some(2));
        assert_eq!(frame.pixels(), &[0, 2, 1, 3]);
        assert_eq!(frame.pixel(2, 0), None);
    }
}
