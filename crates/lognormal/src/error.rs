//! Error types for the hailgen-lognormal crate.

/// Error type for all fallible operations in the hailgen-lognormal crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LognormalError {
    /// Returned when the historical record has no time steps.
    #[error("historical record has no time steps")]
    EmptyInput,

    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when shape and scale grids differ in size.
    #[error("parameter grid mismatch: shape is {shape_dim:?}, scale is {scale_dim:?}")]
    GridMismatch {
        /// `(n_lat, n_lon)` of the shape grid.
        shape_dim: (usize, usize),
        /// `(n_lat, n_lon)` of the scale grid.
        scale_dim: (usize, usize),
    },

    /// Returned when a parameter value is negative or non-finite.
    #[error("invalid {name} parameter at cell ({lat}, {lon}): {value}")]
    InvalidParameter {
        /// `"shape"` or `"scale"`.
        name: &'static str,
        /// Latitude index.
        lat: usize,
        /// Longitude index.
        lon: usize,
        /// The rejected value.
        value: f64,
    },

    /// Returned when a statrs distribution cannot be constructed.
    #[error("log-normal construction failed (shape={shape}, scale={scale}): {message}")]
    Distribution {
        /// Shape parameter.
        shape: f64,
        /// Scale parameter.
        scale: f64,
        /// Description of the failure.
        message: String,
    },
}
