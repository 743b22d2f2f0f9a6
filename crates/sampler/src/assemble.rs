//! Streaming assembly of per-step member arrays into an ensemble.
//!
//! The sampler hands each time step to an [`EnsembleSink`] as soon as it is
//! drawn, so only one `(ensemble, lat, lon)` slab is live at a time. The
//! in-memory [`EnsembleAssembler`] is one sink; a chunked file writer is
//! another.

use chrono::NaiveDateTime;
use hailgen_grid::{GridCoords, ensure_strictly_increasing};
use ndarray::{Array4, ArrayView3, ArrayView4, s};

use crate::error::SamplerError;

/// Default chunk extent along the time axis.
pub const DEFAULT_TIME_CHUNK: usize = 1;

// ---------------------------------------------------------------------------
// EnsembleLayout
// ---------------------------------------------------------------------------

/// Shape, coordinates and chunking of an `(ensemble, time, lat, lon)` array.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleLayout {
    n_ensemble: usize,
    times: Vec<NaiveDateTime>,
    coords: GridCoords,
    chunk: [usize; 4],
}

impl EnsembleLayout {
    /// Create a layout.
    ///
    /// The default chunk is one member at one time step over the full grid.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::InvalidLayout`] for an empty ensemble, empty
    /// time axis or empty grid, and when `times` is not strictly increasing.
    pub fn new(
        n_ensemble: usize,
        times: Vec<NaiveDateTime>,
        coords: GridCoords,
    ) -> Result<Self, SamplerError> {
        let (ny, nx) = coords.shape();
        if n_ensemble == 0 || times.is_empty() || ny == 0 || nx == 0 {
            return Err(SamplerError::InvalidLayout {
                reason: format!(
                    "every dimension must be non-empty, got ensemble={n_ensemble} time={} lat={ny} lon={nx}",
                    times.len()
                ),
            });
        }
        ensure_strictly_increasing(&times).map_err(|e| SamplerError::InvalidLayout {
            reason: e.to_string(),
        })?;
        Ok(Self {
            n_ensemble,
            times,
            coords,
            chunk: [1, DEFAULT_TIME_CHUNK, ny, nx],
        })
    }

    /// Sets the chunk extents `(ensemble, time, lat, lon)`.
    ///
    /// Extents larger than the dimension are clipped to it.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::InvalidLayout`] if any extent is zero.
    pub fn with_chunk(mut self, chunk: [usize; 4]) -> Result<Self, SamplerError> {
        if chunk.contains(&0) {
            return Err(SamplerError::InvalidLayout {
                reason: format!("chunk extents must be positive, got {chunk:?}"),
            });
        }
        let (e, t, y, x) = self.dim();
        let dims = [e, t, y, x];
        self.chunk = std::array::from_fn(|i| chunk[i].min(dims[i]));
        Ok(self)
    }

    /// Number of ensemble members.
    pub fn n_ensemble(&self) -> usize {
        self.n_ensemble
    }

    /// Time coordinate.
    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// Number of time steps.
    pub fn n_times(&self) -> usize {
        self.times.len()
    }

    /// Spatial coordinates.
    pub fn coords(&self) -> &GridCoords {
        &self.coords
    }

    /// Chunk extents `(ensemble, time, lat, lon)`.
    pub fn chunk(&self) -> [usize; 4] {
        self.chunk
    }

    /// Full shape `(ensemble, time, lat, lon)`.
    pub fn dim(&self) -> (usize, usize, usize, usize) {
        let (ny, nx) = self.coords.shape();
        (self.n_ensemble, self.times.len(), ny, nx)
    }

    /// Shape of one time step, `(ensemble, lat, lon)`.
    pub fn member_dim(&self) -> (usize, usize, usize) {
        let (ny, nx) = self.coords.shape();
        (self.n_ensemble, ny, nx)
    }

    /// Check a pushed step against the layout and the next expected index.
    ///
    /// Sinks call this before storing anything.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::StepOutOfOrder`] or
    /// [`SamplerError::MemberShapeMismatch`].
    pub fn check_step(
        &self,
        expected_step: usize,
        step: usize,
        member: &ArrayView3<'_, f64>,
    ) -> Result<(), SamplerError> {
        if step != expected_step || step >= self.n_times() {
            return Err(SamplerError::StepOutOfOrder {
                expected: expected_step,
                got: step,
            });
        }
        if member.dim() != self.member_dim() {
            return Err(SamplerError::MemberShapeMismatch {
                expected: self.member_dim(),
                got: member.dim(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Receives sampled time steps in order.
pub trait EnsembleSink {
    /// Error returned when a step cannot be stored.
    type Error: std::error::Error;

    /// Store the `(ensemble, lat, lon)` slab for time index `step`.
    ///
    /// Steps arrive as `0, 1, 2, ...`; implementations reject anything else.
    fn push_step(&mut self, step: usize, member: ArrayView3<'_, f64>) -> Result<(), Self::Error>;
}

/// In-memory sink collecting every step into one `(ensemble, time, lat, lon)`
/// array.
#[derive(Debug)]
pub struct EnsembleAssembler {
    layout: EnsembleLayout,
    values: Array4<f64>,
    next_step: usize,
}

impl EnsembleAssembler {
    /// Allocate storage for the whole layout.
    pub fn new(layout: EnsembleLayout) -> Self {
        let values = Array4::zeros(layout.dim());
        Self {
            layout,
            values,
            next_step: 0,
        }
    }

    /// Finish assembly.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::Incomplete`] unless every time step arrived.
    pub fn finish(self) -> Result<EnsembleArray, SamplerError> {
        if self.next_step != self.layout.n_times() {
            return Err(SamplerError::Incomplete {
                expected: self.layout.n_times(),
                got: self.next_step,
            });
        }
        EnsembleArray::new(self.values, self.layout)
    }
}

impl EnsembleSink for EnsembleAssembler {
    type Error = SamplerError;

    fn push_step(&mut self, step: usize, member: ArrayView3<'_, f64>) -> Result<(), SamplerError> {
        self.layout.check_step(self.next_step, step, &member)?;
        self.values.slice_mut(s![.., step, .., ..]).assign(&member);
        self.next_step += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EnsembleArray
// ---------------------------------------------------------------------------

/// A complete `(ensemble, time, lat, lon)` hail magnitude ensemble.
#[derive(Debug, Clone)]
pub struct EnsembleArray {
    values: Array4<f64>,
    layout: EnsembleLayout,
}

impl EnsembleArray {
    /// Pair values with their layout.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::InvalidLayout`] if the array shape differs
    /// from the layout.
    pub fn new(values: Array4<f64>, layout: EnsembleLayout) -> Result<Self, SamplerError> {
        if values.dim() != layout.dim() {
            return Err(SamplerError::InvalidLayout {
                reason: format!(
                    "array shape {:?} does not match layout {:?}",
                    values.dim(),
                    layout.dim()
                ),
            });
        }
        Ok(Self { values, layout })
    }

    /// Magnitudes indexed `(ensemble, time, lat, lon)`.
    pub fn values(&self) -> ArrayView4<'_, f64> {
        self.values.view()
    }

    /// Layout and coordinates.
    pub fn layout(&self) -> &EnsembleLayout {
        &self.layout
    }

    /// Time coordinate.
    pub fn times(&self) -> &[NaiveDateTime] {
        self.layout.times()
    }
}
