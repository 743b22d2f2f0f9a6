//! Zero-inflated log-normal sampling of one time step.

use hailgen_lognormal::ParameterGrid;
use ndarray::{Array3, ArrayView2, ArrayViewMut3};
use rand_distr::StandardNormal;

use crate::config::SamplerConfig;
use crate::error::SamplerError;

/// Counts gathered while sampling one time step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Number of `(member, lat, lon)` entries with a non-zero magnitude.
    pub n_events: usize,
}

/// Draws an `(ensemble, lat, lon)` array of hail magnitudes for one time step.
///
/// # Arguments
///
/// * `gate` - `(lat, lon)` gate input: occurrence probabilities, or a
///   historical magnitude slice under the legacy presence gate.
/// * `params` - Per-cell log-normal parameters on the same grid.
/// * `config` - Ensemble size and gate model.
/// * `rng` - Random number generator.
///
/// # Errors
///
/// Returns [`SamplerError::InvalidConfig`] for an invalid configuration and
/// [`SamplerError::GridMismatch`] if `gate` and `params` differ in shape.
pub fn sample_step(
    gate: ArrayView2<'_, f64>,
    params: &ParameterGrid,
    config: &SamplerConfig,
    rng: &mut impl rand::Rng,
) -> Result<Array3<f64>, SamplerError> {
    config.validate()?;
    let (ny, nx) = gate.dim();
    let mut out = Array3::zeros((config.n_ensemble(), ny, nx));
    sample_step_into(gate, params, config, rng, out.view_mut())?;
    Ok(out)
}

/// Draws one time step into a pre-allocated `(ensemble, lat, lon)` buffer.
///
/// For every member and cell a uniform `u` and a standard normal `z` are
/// drawn. The entry is `exp(shape * z + ln(scale))` when `u` falls below the
/// gate probability and the cell has a positive scale, and `0.0` otherwise.
/// Every entry of `out` is overwritten.
///
/// # Errors
///
/// Returns [`SamplerError::GridMismatch`] if `gate` and `params` differ in
/// shape, or [`SamplerError::MemberShapeMismatch`] if `out` is not
/// `(n_ensemble, n_lat, n_lon)`.
pub fn sample_step_into(
    gate: ArrayView2<'_, f64>,
    params: &ParameterGrid,
    config: &SamplerConfig,
    rng: &mut impl rand::Rng,
    mut out: ArrayViewMut3<'_, f64>,
) -> Result<StepStats, SamplerError> {
    if gate.dim() != params.dim() {
        return Err(SamplerError::GridMismatch {
            gate: gate.dim(),
            params: params.dim(),
        });
    }
    let (ny, nx) = gate.dim();
    let expected = (config.n_ensemble(), ny, nx);
    if out.dim() != expected {
        return Err(SamplerError::MemberShapeMismatch {
            expected,
            got: out.dim(),
        });
    }

    let gate_model = config.gate();
    let prob = gate.mapv(|v| gate_model.probability(v));
    let shape = params.shape();
    let log_scale = params.scale().mapv(|s| if s > 0.0 { s.ln() } else { f64::NAN });

    let mut stats = StepStats::default();
    for mut member in out.outer_iter_mut() {
        for ((y, x), slot) in member.indexed_iter_mut() {
            let u: f64 = rng.random();
            let z: f64 = rng.sample(StandardNormal);
            let mu = log_scale[[y, x]];
            *slot = if u < prob[[y, x]] && !mu.is_nan() {
                stats.n_events += 1;
                (shape[[y, x]] * z + mu).exp()
            } else {
                0.0
            };
        }
    }
    Ok(stats)
}
