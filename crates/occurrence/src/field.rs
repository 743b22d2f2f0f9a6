//! Occurrence probability fields.

use hailgen_grid::GriddedField;
use hailgen_stats::logistic;
use tracing::debug;

use crate::config::OccurrenceConfig;
use crate::error::OccurrenceError;

/// A `(time, lat, lon)` field of hail occurrence probabilities.
///
/// Values are in `[0, 1]` or NaN (missing). Every finite value is either 0
/// or strictly above the floor it was built with.
#[derive(Debug, Clone)]
pub struct OccurrenceField {
    field: GriddedField,
}

impl OccurrenceField {
    /// The underlying gridded field.
    pub fn as_field(&self) -> &GriddedField {
        &self.field
    }

    /// Consume and return the underlying gridded field.
    pub fn into_field(self) -> GriddedField {
        self.field
    }

    /// Number of time steps.
    pub fn n_times(&self) -> usize {
        self.field.n_times()
    }
}

/// Convert a log-odds field into occurrence probabilities.
///
/// Applies the logistic transform, then zeroes every probability at or
/// below `config.threshold()`. NaN log-odds stay NaN.
///
/// # Errors
///
/// Returns [`OccurrenceError::EmptyInput`] if `logits` has no time steps,
/// or [`OccurrenceError::InvalidConfig`] if the configuration is invalid.
pub fn build_occurrence_field(
    logits: &GriddedField,
    config: &OccurrenceConfig,
) -> Result<OccurrenceField, OccurrenceError> {
    config.validate()?;
    if logits.n_times() == 0 {
        return Err(OccurrenceError::EmptyInput);
    }

    let threshold = config.threshold();
    let field = logits.map(|x| floor_probability(logistic(x), threshold));

    let n_active = field.values().iter().filter(|&&p| p > 0.0).count();
    debug!(
        n_times = field.n_times(),
        n_active,
        threshold,
        "built occurrence probability field"
    );

    Ok(OccurrenceField { field })
}

/// Zero a probability at or below the floor. NaN passes through.
fn floor_probability(p: f64, threshold: f64) -> f64 {
    if p <= threshold { 0.0 } else { p }
}

/// Build the legacy presence field from a historical magnitude record.
///
/// Each value becomes 1.0 where the historical value is strictly positive
/// and 0.0 otherwise (including NaN).
///
/// # Errors
///
/// Returns [`OccurrenceError::EmptyInput`] if `historical` has no time steps.
pub fn presence_field(historical: &GriddedField) -> Result<OccurrenceField, OccurrenceError> {
    if historical.n_times() == 0 {
        return Err(OccurrenceError::EmptyInput);
    }
    let field = historical.map(|v| if v > 0.0 { 1.0 } else { 0.0 });
    Ok(OccurrenceField { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_zeroes_at_and_below() {
        assert_eq!(floor_probability(0.1, 0.1), 0.0);
        assert_eq!(floor_probability(0.05, 0.1), 0.0);
        assert_eq!(floor_probability(0.1000001, 0.1), 0.1000001);
        assert!(floor_probability(f64::NAN, 0.1).is_nan());
    }
}
