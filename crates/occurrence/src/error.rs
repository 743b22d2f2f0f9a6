//! Error types for the hailgen-occurrence crate.

/// Error type for all fallible operations in the hailgen-occurrence crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OccurrenceError {
    /// Returned when the input field has no time steps.
    #[error("no time steps to build occurrence probabilities from")]
    EmptyInput,

    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_empty_input() {
        assert_eq!(
            OccurrenceError::EmptyInput.to_string(),
            "no time steps to build occurrence probabilities from"
        );
    }

    #[test]
    fn error_invalid_config() {
        let e = OccurrenceError::InvalidConfig {
            reason: "threshold must be in [0, 1), got 1.5".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "invalid configuration: threshold must be in [0, 1), got 1.5"
        );
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<OccurrenceError>();
    }
}
