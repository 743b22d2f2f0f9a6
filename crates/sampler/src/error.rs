//! Error types for the hailgen-sampler crate.

/// Error type for all fallible operations in the hailgen-sampler crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SamplerError {
    /// Returned when the gate field has no time steps.
    #[error("no time steps to sample")]
    EmptyInput,

    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the gate grid and the parameter grid differ.
    #[error("grid mismatch: gate field is {gate:?}, parameters are {params:?}")]
    GridMismatch {
        /// `(n_lat, n_lon)` of the gate field.
        gate: (usize, usize),
        /// `(n_lat, n_lon)` of the parameter grid.
        params: (usize, usize),
    },

    /// Returned when a member array does not have the expected shape.
    #[error("member shape mismatch: expected {expected:?}, got {got:?}")]
    MemberShapeMismatch {
        /// Expected `(ensemble, lat, lon)`.
        expected: (usize, usize, usize),
        /// Actual `(ensemble, lat, lon)`.
        got: (usize, usize, usize),
    },

    /// Returned when a sink receives steps out of order.
    #[error("out-of-order time step: expected {expected}, got {got}")]
    StepOutOfOrder {
        /// Next step the sink expected.
        expected: usize,
        /// Step that was pushed.
        got: usize,
    },

    /// Returned when an assembler is finished before every step arrived.
    #[error("incomplete ensemble: {got} of {expected} time steps received")]
    Incomplete {
        /// Number of time steps in the layout.
        expected: usize,
        /// Number of time steps received.
        got: usize,
    },

    /// Returned when an ensemble layout is malformed.
    #[error("invalid layout: {reason}")]
    InvalidLayout {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the sink rejects a time step.
    #[error("sink failed at time step {step}: {reason}")]
    Sink {
        /// Step being written.
        step: usize,
        /// Description of the underlying failure.
        reason: String,
    },
}
