//! Error types for the hailgen-climatology crate.

/// Error type for all fallible operations in the hailgen-climatology crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClimatologyError {
    /// Returned when a magnitude range is malformed.
    #[error("invalid magnitude range [{low}, {high}): {reason}")]
    InvalidRange {
        /// Lower bound (inclusive).
        low: f64,
        /// Upper bound (exclusive).
        high: f64,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the ensemble selection has no members or no time steps.
    #[error("empty selection: {reason}")]
    EmptySelection {
        /// Description of what was empty.
        reason: String,
    },
}
