//! Error types for the hailgen-grid crate.

/// Error type for all fallible operations in the hailgen-grid crate.
///
/// Covers shape/coordinate consistency checks on gridded fields, time
/// window resolution, and bounding-box subsetting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Returned when a time window selects no time steps.
    #[error("no time steps found in window {window}")]
    EmptySelection {
        /// Human-readable form of the requested window.
        window: String,
    },

    /// Returned when a bounding box contains no grid cells.
    #[error("bounding box {bbox} contains no grid cells")]
    EmptyRegion {
        /// Human-readable form of the requested bounding box.
        bbox: String,
    },

    /// Returned when an array axis does not match its coordinate vector.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension.
        name: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Returned when the time coordinate is not strictly increasing.
    #[error("time coordinate is not strictly increasing at index {index}")]
    NonMonotonicTime {
        /// First index whose timestamp is not after its predecessor.
        index: usize,
    },

    /// Returned when two fields that must share a grid do not.
    #[error("{name} coordinates differ between fields")]
    CoordinateMismatch {
        /// Which coordinate differs (`"lat"` or `"lon"`).
        name: String,
    },

    /// Returned when a date string cannot be parsed.
    #[error("invalid date '{input}': expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS")]
    InvalidDate {
        /// The rejected input.
        input: String,
    },

    /// Returned when a time window has its end before its start.
    #[error("invalid time window: {reason}")]
    InvalidWindow {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when bounding-box limits are malformed.
    #[error("invalid bounding box: {reason}")]
    InvalidBoundingBox {
        /// Description of the problem.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_empty_selection() {
        let err = GridError::EmptySelection {
            window: "2030-01-01..=2030-12-31".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no time steps found in window 2030-01-01..=2030-12-31"
        );
    }

    #[test]
    fn display_dimension_mismatch() {
        let err = GridError::DimensionMismatch {
            name: "lat".to_string(),
            expected: 10,
            got: 9,
        };
        assert_eq!(
            err.to_string(),
            "dimension 'lat' mismatch: expected 10, got 9"
        );
    }

    #[test]
    fn display_non_monotonic() {
        let err = GridError::NonMonotonicTime { index: 4 };
        assert_eq!(
            err.to_string(),
            "time coordinate is not strictly increasing at index 4"
        );
    }

    #[test]
    fn display_invalid_date() {
        let err = GridError::InvalidDate {
            input: "2010/01/01".to_string(),
        };
        assert!(err.to_string().contains("'2010/01/01'"));
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<GridError>();
    }
}
