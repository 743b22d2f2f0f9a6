//! Drive the sampler over every time step of a gate field.

use hailgen_grid::GriddedField;
use hailgen_lognormal::ParameterGrid;
use ndarray::Array3;
use tracing::info;

use crate::assemble::EnsembleSink;
use crate::config::SamplerConfig;
use crate::error::SamplerError;
use crate::sample::sample_step_into;

/// Totals reported after a sampling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingSummary {
    /// Number of time steps sampled.
    pub n_steps: usize,
    /// Ensemble members per step.
    pub n_ensemble: usize,
    /// Grid cells per step.
    pub n_cells: usize,
    /// Total number of non-zero magnitudes drawn.
    pub n_events: usize,
}

impl SamplingSummary {
    /// Fraction of all drawn entries that are non-zero.
    pub fn event_fraction(&self) -> f64 {
        let total = self.n_steps * self.n_ensemble * self.n_cells;
        if total == 0 {
            0.0
        } else {
            self.n_events as f64 / total as f64
        }
    }
}

/// Samples every time step of `gate` and streams the results into `sink`.
///
/// One `(ensemble, lat, lon)` buffer is reused for all steps. Steps are
/// pushed in time order, starting at 0.
///
/// # Errors
///
/// Returns [`SamplerError::EmptyInput`] if `gate` has no time steps,
/// [`SamplerError::GridMismatch`] if the grids differ, and
/// [`SamplerError::Sink`] if the sink rejects a step.
pub fn run_sampler<S: EnsembleSink>(
    gate: &GriddedField,
    params: &ParameterGrid,
    config: &SamplerConfig,
    rng: &mut impl rand::Rng,
    sink: &mut S,
) -> Result<SamplingSummary, SamplerError> {
    config.validate()?;
    if gate.n_times() == 0 {
        return Err(SamplerError::EmptyInput);
    }
    if gate.grid_shape() != params.dim() {
        return Err(SamplerError::GridMismatch {
            gate: gate.grid_shape(),
            params: params.dim(),
        });
    }

    let (ny, nx) = gate.grid_shape();
    let n_steps = gate.n_times();
    info!(
        n_steps,
        n_ensemble = config.n_ensemble(),
        n_lat = ny,
        n_lon = nx,
        gate = config.gate().name(),
        "sampling hail ensemble"
    );

    let mut buffer = Array3::zeros((config.n_ensemble(), ny, nx));
    let mut n_events = 0usize;
    for (t, time) in gate.times().iter().enumerate() {
        let stats = sample_step_into(gate.time_slice(t), params, config, rng, buffer.view_mut())?;
        sink.push_step(t, buffer.view()).map_err(|e| SamplerError::Sink {
            step: t,
            reason: e.to_string(),
        })?;
        n_events += stats.n_events;
        info!(step = t + 1, n_steps, %time, n_events = stats.n_events, "sampled time step");
    }

    let summary = SamplingSummary {
        n_steps,
        n_ensemble: config.n_ensemble(),
        n_cells: ny * nx,
        n_events,
    };
    info!(
        n_events,
        event_fraction = summary.event_fraction(),
        "sampling complete"
    );
    Ok(summary)
}
