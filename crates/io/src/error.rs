//! Error types for hailgen-io.

use std::path::PathBuf;

use hailgen_grid::GridError;
use hailgen_lognormal::LognormalError;
use hailgen_sampler::SamplerError;

/// Error type for all fallible operations in the hailgen-io crate.
///
/// Covers filesystem and NetCDF failures, malformed coordinate or time
/// metadata, and data-model errors raised while turning file contents into
/// grids, parameter fields and ensembles.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Returned when creating, renaming or removing a file fails.
    #[error("filesystem error at {}: {reason}", path.display())]
    Filesystem {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Description of the underlying failure.
        reason: String,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when a required variable is not present in a file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a dimension has an unexpected size.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when a time value or time unit cannot be interpreted.
    #[error("invalid time: {reason}")]
    InvalidTime {
        /// Description of the time parsing issue.
        reason: String,
    },

    /// Returned when an ensemble member selection matches nothing.
    #[error("empty selection: {reason}")]
    EmptySelection {
        /// Description of what was selected.
        reason: String,
    },

    /// Grid, window or bounding-box error.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Parameter-grid error.
    #[error(transparent)]
    Lognormal(#[from] LognormalError),

    /// Ensemble layout or step-ordering error.
    #[error(transparent)]
    Sampler(#[from] SamplerError),
}

impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        IoError::Netcdf {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_file_not_found() {
        let err = IoError::FileNotFound {
            path: PathBuf::from("/tmp/missing.nc"),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.nc");
    }

    #[test]
    fn display_netcdf() {
        let err = IoError::Netcdf {
            reason: "bad header".to_string(),
        };
        assert_eq!(err.to_string(), "netcdf error: bad header");
    }

    #[test]
    fn display_filesystem() {
        let err = IoError::Filesystem {
            path: PathBuf::from("/out/run.nc"),
            reason: "permission denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "filesystem error at /out/run.nc: permission denied"
        );
    }

    #[test]
    fn display_validation() {
        let err = IoError::Validation {
            count: 1,
            details: "deflate level must be 0..=9, got 12".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "1 validation error(s): deflate level must be 0..=9, got 12"
        );
    }

    #[test]
    fn display_missing_variable() {
        let err = IoError::MissingVariable {
            name: "hail_logits".to_string(),
            path: PathBuf::from("/data/hail.nc"),
        };
        assert_eq!(
            err.to_string(),
            "variable 'hail_logits' not found in /data/hail.nc"
        );
    }

    #[test]
    fn display_dimension_mismatch() {
        let err = IoError::DimensionMismatch {
            name: "lat".to_string(),
            expected: 120,
            got: 121,
        };
        assert_eq!(
            err.to_string(),
            "dimension 'lat' mismatch: expected 120, got 121"
        );
    }

    #[test]
    fn display_invalid_time() {
        let err = IoError::InvalidTime {
            reason: "unsupported calendar 'noleap'".to_string(),
        };
        assert_eq!(err.to_string(), "invalid time: unsupported calendar 'noleap'");
    }

    #[test]
    fn grid_error_is_transparent() {
        let err: IoError = GridError::EmptySelection {
            window: "[2030-01-01 00:00:00, +inf)".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "no time steps found in window [2030-01-01 00:00:00, +inf)"
        );
    }

    #[test]
    fn from_netcdf_error() {
        let nc_err = netcdf::Error::Str("test nc error".to_string());
        let err: IoError = nc_err.into();
        assert!(matches!(err, IoError::Netcdf { .. }));
        assert!(err.to_string().contains("test nc error"));
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<IoError>();
    }
}
