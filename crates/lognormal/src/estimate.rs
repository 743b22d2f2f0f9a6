//! Per-cell parameter estimation over a historical record.

use hailgen_stats::positive_moments;
use ndarray::{Array2, ArrayView2, ArrayView3, s};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::EstimatorConfig;
use crate::error::LognormalError;
use crate::params::LogNormalParams;

/// Per-cell log-normal parameters over a `(lat, lon)` grid.
///
/// Both grids share one shape and hold finite, non-negative values.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    shape: Array2<f64>,
    scale: Array2<f64>,
}

impl ParameterGrid {
    /// Create a grid from separately stored shape and scale fields.
    ///
    /// NaN entries (e.g. fill values in a stored parameter file) are read as
    /// "no usable distribution" and become 0.
    ///
    /// # Errors
    ///
    /// Returns [`LognormalError::GridMismatch`] if the grids differ in size
    /// and [`LognormalError::InvalidParameter`] for negative or infinite
    /// values.
    pub fn new(shape: Array2<f64>, scale: Array2<f64>) -> Result<Self, LognormalError> {
        if shape.dim() != scale.dim() {
            return Err(LognormalError::GridMismatch {
                shape_dim: shape.dim(),
                scale_dim: scale.dim(),
            });
        }
        let shape = shape.mapv(nan_to_zero);
        let scale = scale.mapv(nan_to_zero);
        check_non_negative("shape", shape.view())?;
        check_non_negative("scale", scale.view())?;
        Ok(Self { shape, scale })
    }

    /// Shape (sigma) field.
    pub fn shape(&self) -> ArrayView2<'_, f64> {
        self.shape.view()
    }

    /// Scale (median) field.
    pub fn scale(&self) -> ArrayView2<'_, f64> {
        self.scale.view()
    }

    /// `(n_lat, n_lon)`.
    pub fn dim(&self) -> (usize, usize) {
        self.shape.dim()
    }

    /// Parameters of cell `(lat, lon)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn get(&self, lat: usize, lon: usize) -> LogNormalParams {
        LogNormalParams::new(self.shape[[lat, lon]], self.scale[[lat, lon]])
            .unwrap_or_else(LogNormalParams::degenerate)
    }

    /// Number of cells with a usable distribution.
    pub fn n_valid(&self) -> usize {
        self.scale.iter().filter(|&&s| s > 0.0).count()
    }
}

fn nan_to_zero(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v }
}

fn check_non_negative(name: &'static str, grid: ArrayView2<'_, f64>) -> Result<(), LognormalError> {
    match grid
        .indexed_iter()
        .find(|(_, v)| !(v.is_finite() && **v >= 0.0))
    {
        Some(((lat, lon), &value)) => Err(LognormalError::InvalidParameter {
            name,
            lat,
            lon,
            value,
        }),
        None => Ok(()),
    }
}

/// Estimate per-cell log-normal parameters from a `(time, lat, lon)` record.
///
/// For every cell the positive, finite observations over time are reduced
/// to a count, mean and population standard deviation and moment-matched
/// with [`LogNormalParams::from_moments`]. Cells with fewer than
/// `config.min_samples()` positive observations get
/// [`LogNormalParams::degenerate`]; their number is reported as a warning.
///
/// # Errors
///
/// Returns [`LognormalError::EmptyInput`] if the record has no time steps
/// and [`LognormalError::InvalidConfig`] for an invalid configuration.
pub fn estimate_parameters(
    record: ArrayView3<'_, f64>,
    config: &EstimatorConfig,
) -> Result<ParameterGrid, LognormalError> {
    config.validate()?;
    let (nt, ny, nx) = record.dim();
    if nt == 0 {
        return Err(LognormalError::EmptyInput);
    }

    let min_samples = config.min_samples();
    let floor = config.floor();

    let cells: Vec<LogNormalParams> = (0..ny * nx)
        .into_par_iter()
        .map(|c| {
            let series = record.slice(s![.., c / nx, c % nx]);
            let m = positive_moments(series.iter().copied());
            if m.count < min_samples {
                LogNormalParams::degenerate()
            } else {
                LogNormalParams::from_moments(
                    m.mean.unwrap_or(floor),
                    m.sd.unwrap_or(floor),
                    floor,
                )
            }
        })
        .collect();

    let n_degenerate = cells.iter().filter(|p| !p.is_valid()).count();
    if n_degenerate > 0 {
        warn!(
            n_degenerate,
            n_cells = cells.len(),
            min_samples,
            "cells with too few positive observations; parameters set to zero"
        );
    }
    info!(
        n_times = nt,
        n_cells = cells.len(),
        n_valid = cells.len() - n_degenerate,
        "log-normal parameters estimated"
    );

    let shape = Array2::from_shape_fn((ny, nx), |(y, x)| cells[y * nx + x].shape());
    let scale = Array2::from_shape_fn((ny, nx), |(y, x)| cells[y * nx + x].scale());
    Ok(ParameterGrid { shape, scale })
}
