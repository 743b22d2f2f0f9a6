//! # hailgen-occurrence
//!
//! Builds per-cell hail occurrence probabilities from model log-odds.
//!
//! The logistic transform maps log-odds to `(0, 1)`; a configurable floor
//! (default 0.1) then zeroes low probabilities, giving the occurrence gate a
//! deliberate point mass at "no hail". A presence field built from a
//! historical magnitude record is also provided for the legacy
//! presence-gated sampler.
//!
//! ```
//! use hailgen_occurrence::OccurrenceConfig;
//!
//! let config = OccurrenceConfig::new();
//! assert_eq!(config.threshold(), 0.1);
//! ```

mod config;
mod error;
mod field;

pub use config::{DEFAULT_THRESHOLD, OccurrenceConfig};
pub use error::OccurrenceError;
pub use field::{OccurrenceField, build_occurrence_field, presence_field};
