//! Configuration for occurrence probability construction.

use crate::error::OccurrenceError;

/// Default probability floor: probabilities at or below this are zeroed.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Configuration for turning hail log-odds into occurrence probabilities.
///
/// # Example
///
/// ```
/// use hailgen_occurrence::OccurrenceConfig;
///
/// let config = OccurrenceConfig::new().with_threshold(0.05);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccurrenceConfig {
    threshold: f64,
}

impl Default for OccurrenceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OccurrenceConfig {
    /// Creates a configuration with the default floor of 0.1.
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Sets the zero-inflation floor.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns the zero-inflation floor.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Validates this configuration.
    ///
    /// The floor must be finite and lie in `[0, 1)`; a floor of 1 would
    /// suppress every event.
    pub fn validate(&self) -> Result<(), OccurrenceError> {
        if !self.threshold.is_finite() || !(0.0..1.0).contains(&self.threshold) {
            return Err(OccurrenceError::InvalidConfig {
                reason: format!("threshold must be in [0, 1), got {}", self.threshold),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold() {
        assert_eq!(OccurrenceConfig::default().threshold(), 0.1);
    }

    #[test]
    fn validate_accepts_range() {
        for t in [0.0, 0.1, 0.5, 0.999] {
            assert!(OccurrenceConfig::new().with_threshold(t).validate().is_ok());
        }
    }

    #[test]
    fn validate_rejects_out_of_range() {
        for t in [-0.1, 1.0, 2.0, f64::NAN] {
            let err = OccurrenceConfig::new()
                .with_threshold(t)
                .validate()
                .unwrap_err();
            assert!(matches!(err, OccurrenceError::InvalidConfig { .. }));
        }
    }
}
