//! # hailgen-lognormal
//!
//! Per-grid-cell log-normal distributions for hail magnitude conditional on
//! occurrence.
//!
//! Parameters are moment-matched from the count, mean and standard
//! deviation of the positive observations of a historical record. Cells
//! with too little evidence carry zero parameters, which the sampler treats
//! as "never produces hail".
//!
//! # Quick start
//!
//! ```rust
//! use hailgen_lognormal::{EstimatorConfig, estimate_parameters};
//! use ndarray::Array3;
//!
//! // 4 time steps over a 1x2 grid; the second cell never sees hail.
//! let record = Array3::from_shape_vec(
//!     (4, 1, 2),
//!     vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 0.0, 0.0],
//! )
//! .unwrap();
//!
//! let grid = estimate_parameters(record.view(), &EstimatorConfig::new()).unwrap();
//! assert!(grid.get(0, 0).is_valid());
//! assert!(!grid.get(0, 1).is_valid());
//! ```

mod config;
mod error;
mod estimate;
mod params;

pub use config::EstimatorConfig;
pub use error::LognormalError;
pub use estimate::{ParameterGrid, estimate_parameters};
pub use params::LogNormalParams;
