//! Half-open hail magnitude ranges.

use std::fmt;

use crate::error::ClimatologyError;

/// Half-open magnitude interval `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudeRange {
    low: f64,
    high: f64,
}

impl MagnitudeRange {
    /// Create a range.
    ///
    /// # Errors
    ///
    /// Returns [`ClimatologyError::InvalidRange`] if a bound is not finite or
    /// `low >= high`.
    pub fn new(low: f64, high: f64) -> Result<Self, ClimatologyError> {
        if !low.is_finite() || !high.is_finite() {
            return Err(ClimatologyError::InvalidRange {
                low,
                high,
                reason: "bounds must be finite".to_string(),
            });
        }
        if low >= high {
            return Err(ClimatologyError::InvalidRange {
                low,
                high,
                reason: "low must be below high".to_string(),
            });
        }
        Ok(Self { low, high })
    }

    /// Inclusive lower bound.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Exclusive upper bound.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Returns `true` if `low <= m < high`. NaN is never contained.
    pub fn contains(&self, m: f64) -> bool {
        m >= self.low && m < self.high
    }

    /// Output variable name, e.g. `probability_0.1_1`.
    pub fn variable_name(&self) -> String {
        format!("probability_{}_{}", self.low, self.high)
    }
}

impl fmt::Display for MagnitudeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.low, self.high)
    }
}

/// The standard ranges `[0.1, 1)`, `[1, 2)` and `[2, 25)`.
pub fn default_ranges() -> Vec<MagnitudeRange> {
    [(0.1, 1.0), (1.0, 2.0), (2.0, 25.0)]
        .into_iter()
        .map(|(low, high)| MagnitudeRange { low, high })
        .collect()
}
