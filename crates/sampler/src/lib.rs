//! # hailgen-sampler
//!
//! Draws ensembles of gridded hail magnitudes from a zero-inflated
//! log-normal model: an occurrence gate decides whether hail happens in a
//! cell, and a per-cell log-normal gives its size.
//!
//! ## Pipeline
//!
//! ```text
//! gate field (time, lat, lon) ──┐
//!                               ├─► sample_step ─► EnsembleSink::push_step
//! ParameterGrid (lat, lon) ─────┘      (per time step, reused buffer)
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | Ensemble size and gate model |
//! | `sample` | One-step zero-inflated log-normal draw |
//! | `run` | Time loop with progress logging |
//! | `assemble` | Ensemble layout, sink trait, in-memory assembler |
//! | `error` | Error types |
//!
//! ## Quick start
//!
//! ```
//! use hailgen_lognormal::ParameterGrid;
//! use hailgen_sampler::{SamplerConfig, sample_step};
//! use ndarray::Array2;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let params = ParameterGrid::new(
//!     Array2::from_elem((1, 1), 0.5),
//!     Array2::from_elem((1, 1), 2.0),
//! )
//! .unwrap();
//! let probability = Array2::from_elem((1, 1), 1.0);
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! let step = sample_step(probability.view(), &params, &SamplerConfig::new(1), &mut rng).unwrap();
//! assert!(step[[0, 0, 0]] > 0.0);
//! ```

mod assemble;
mod config;
mod error;
mod run;
mod sample;

pub use assemble::{
    DEFAULT_TIME_CHUNK, EnsembleArray, EnsembleAssembler, EnsembleLayout, EnsembleSink,
};
pub use config::{DEFAULT_ZERO_PROB, GateModel, SamplerConfig};
pub use error::SamplerError;
pub use run::{SamplingSummary, run_sampler};
pub use sample::{StepStats, sample_step, sample_step_into};
