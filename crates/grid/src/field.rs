//! Gridded `(time, lat, lon)` scalar fields.

use chrono::NaiveDateTime;
use ndarray::{Array3, ArrayView2, ArrayView3, Axis, concatenate, s};

use crate::coords::{BoundingBox, GridCoords};
use crate::error::GridError;
use crate::window::ensure_strictly_increasing;

/// A scalar field indexed by `(time, lat, lon)` with its coordinates.
///
/// Construction guarantees that the array shape agrees with the coordinate
/// vectors and that `times` is strictly increasing.
#[derive(Debug, Clone)]
pub struct GriddedField {
    values: Array3<f64>,
    times: Vec<NaiveDateTime>,
    coords: GridCoords,
}

impl GriddedField {
    /// Create a field after validating shape and time ordering.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if an axis length differs from
    /// its coordinate vector, or [`GridError::NonMonotonicTime`] if `times`
    /// is not strictly increasing.
    pub fn new(
        values: Array3<f64>,
        times: Vec<NaiveDateTime>,
        coords: GridCoords,
    ) -> Result<Self, GridError> {
        let (nt, ny, nx) = values.dim();
        for (name, expected, got) in [
            ("time", times.len(), nt),
            ("lat", coords.n_lat(), ny),
            ("lon", coords.n_lon(), nx),
        ] {
            if expected != got {
                return Err(GridError::DimensionMismatch {
                    name: name.to_string(),
                    expected,
                    got,
                });
            }
        }
        ensure_strictly_increasing(&times)?;
        Ok(Self {
            values,
            times,
            coords,
        })
    }

    /// Field values.
    pub fn values(&self) -> ArrayView3<'_, f64> {
        self.values.view()
    }

    /// Time coordinate.
    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// Spatial coordinates.
    pub fn coords(&self) -> &GridCoords {
        &self.coords
    }

    /// Number of time steps.
    pub fn n_times(&self) -> usize {
        self.times.len()
    }

    /// `(n_lat, n_lon)`.
    pub fn grid_shape(&self) -> (usize, usize) {
        self.coords.shape()
    }

    /// The 2-D slice at time index `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t >= self.n_times()`.
    pub fn time_slice(&self, t: usize) -> ArrayView2<'_, f64> {
        self.values.index_axis(Axis(0), t)
    }

    /// Apply `f` to every value, keeping coordinates.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            values: self.values.mapv(f),
            times: self.times.clone(),
            coords: self.coords.clone(),
        }
    }

    /// Restrict the field to the cells inside `bbox`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyRegion`] when the box contains no cells.
    pub fn subset(&self, bbox: &BoundingBox) -> Result<Self, GridError> {
        let (lat, lon) = bbox.index_ranges(&self.coords)?;
        Ok(Self {
            values: self
                .values
                .slice(s![.., lat.clone(), lon.clone()])
                .to_owned(),
            times: self.times.clone(),
            coords: self.coords.slice(lat, lon),
        })
    }

    /// Concatenate fields along time, in the given order.
    ///
    /// All parts must share one grid and together keep time strictly
    /// increasing.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptySelection`] for an empty input list, a
    /// coordinate error if grids differ, or [`GridError::NonMonotonicTime`]
    /// if the parts overlap or are out of order.
    pub fn concat_time(parts: Vec<GriddedField>) -> Result<Self, GridError> {
        let mut iter = parts.into_iter();
        let Some(first) = iter.next() else {
            return Err(GridError::EmptySelection {
                window: "(no input fields)".to_string(),
            });
        };
        let rest: Vec<GriddedField> = iter.collect();
        if rest.is_empty() {
            return Ok(first);
        }

        let mut times = first.times.clone();
        for part in &rest {
            first.coords.ensure_matches(&part.coords)?;
            times.extend_from_slice(&part.times);
        }

        let views: Vec<ArrayView3<'_, f64>> = std::iter::once(first.values.view())
            .chain(rest.iter().map(|p| p.values.view()))
            .collect();
        let values = concatenate(Axis(0), &views).map_err(|_| GridError::DimensionMismatch {
            name: "time".to_string(),
            expected: times.len(),
            got: 0,
        })?;

        Self::new(values, times, first.coords)
    }
}
