//! Configuration for per-cell parameter estimation.

use crate::error::LognormalError;

/// Configuration for moment-matched log-normal estimation.
///
/// # Example
///
/// ```
/// use hailgen_lognormal::EstimatorConfig;
///
/// let config = EstimatorConfig::new().with_min_samples(3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorConfig {
    min_samples: usize,
    floor: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EstimatorConfig {
    /// Creates a configuration with defaults.
    ///
    /// Defaults: `min_samples = 2`, `floor = 1e-6`.
    pub fn new() -> Self {
        Self {
            min_samples: 2,
            floor: 1e-6,
        }
    }

    /// Sets the minimum number of positive observations for a usable cell.
    pub fn with_min_samples(mut self, n: usize) -> Self {
        self.min_samples = n;
        self
    }

    /// Sets the positive floor substituted for zero or missing moments.
    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }

    /// Returns the minimum number of positive observations.
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Returns the moment floor.
    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), LognormalError> {
        if self.min_samples == 0 {
            return Err(LognormalError::InvalidConfig {
                reason: "min_samples must be at least 1".to_string(),
            });
        }
        if !self.floor.is_finite() || self.floor <= 0.0 {
            return Err(LognormalError::InvalidConfig {
                reason: format!("floor must be finite and positive, got {}", self.floor),
            });
        }
        Ok(())
    }
}
