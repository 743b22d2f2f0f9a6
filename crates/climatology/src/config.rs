//! Configuration for climatological aggregation.

use crate::error::ClimatologyError;
use crate::range::{MagnitudeRange, default_ranges};

/// Magnitude ranges to summarise.
///
/// Defaults to [`default_ranges`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClimatologyConfig {
    ranges: Vec<MagnitudeRange>,
}

impl Default for ClimatologyConfig {
    fn default() -> Self {
        Self {
            ranges: default_ranges(),
        }
    }
}

impl ClimatologyConfig {
    /// Configuration with the default ranges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the magnitude ranges.
    pub fn with_ranges(mut self, ranges: Vec<MagnitudeRange>) -> Self {
        self.ranges = ranges;
        self
    }

    /// The magnitude ranges.
    pub fn ranges(&self) -> &[MagnitudeRange] {
        &self.ranges
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClimatologyError::InvalidConfig`] if there are no ranges or
    /// two ranges would produce the same variable name.
    pub fn validate(&self) -> Result<(), ClimatologyError> {
        if self.ranges.is_empty() {
            return Err(ClimatologyError::InvalidConfig {
                reason: "at least one magnitude range is required".to_string(),
            });
        }
        for (i, r) in self.ranges.iter().enumerate() {
            if self.ranges[..i].contains(r) {
                return Err(ClimatologyError::InvalidConfig {
                    reason: format!("duplicate magnitude range {r}"),
                });
            }
        }
        Ok(())
    }
}
