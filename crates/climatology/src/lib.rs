//! # hailgen-climatology
//!
//! Reduces a sampled `(ensemble, time, lat, lon)` hail ensemble to
//! climatological probabilities: for each magnitude range, the fraction of
//! members and time steps whose magnitude falls in the range, per cell.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `range` | Half-open magnitude ranges and their variable names |
//! | `config` | Range selection |
//! | `aggregate` | Per-cell range probabilities |
//! | `id` | Output naming by year and member span |
//! | `error` | Error types |

mod aggregate;
mod config;
mod error;
mod id;
mod range;

pub use aggregate::{ProbabilitySummary, aggregate};
pub use config::ClimatologyConfig;
pub use error::ClimatologyError;
pub use id::SummaryId;
pub use range::{MagnitudeRange, default_ranges};
