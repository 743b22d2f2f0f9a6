//! Chunked, compressed NetCDF output.

use std::path::{Path, PathBuf};

use hailgen_climatology::ProbabilitySummary;
use hailgen_grid::GridCoords;
use hailgen_sampler::{EnsembleLayout, EnsembleSink, SamplerError};
use ndarray::{ArrayView2, ArrayView3};
use tracing::{debug, info};

use crate::error::IoError;
use crate::netcdf_read::{EPOCH_HOURS_UNITS, hours_since_epoch};
use crate::partial::PartialFile;

/// Name of the 4-D magnitude variable in ensemble files.
pub const MAGNITUDE_VAR: &str = "sampled_hail_magnitudes";

/// Default deflate level.
pub const DEFAULT_DEFLATE_LEVEL: u8 = 4;

// ---------------------------------------------------------------------------
// EncodingConfig
// ---------------------------------------------------------------------------

/// Floating-point type stored on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageDtype {
    /// 32-bit floats.
    #[default]
    Float32,
    /// 64-bit floats.
    Float64,
}

/// Compression applied to data variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// No compression.
    None,
    /// zlib deflate at the given level (0-9).
    Deflate {
        /// Deflate level.
        level: u8,
    },
}

impl Default for Compression {
    fn default() -> Self {
        Self::Deflate {
            level: DEFAULT_DEFLATE_LEVEL,
        }
    }
}

/// Storage encoding for output variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingConfig {
    dtype: StorageDtype,
    compression: Compression,
    shuffle: bool,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            dtype: StorageDtype::default(),
            compression: Compression::default(),
            shuffle: true,
        }
    }
}

impl EncodingConfig {
    /// Sets the on-disk float type.
    pub fn with_dtype(mut self, dtype: StorageDtype) -> Self {
        self.dtype = dtype;
        self
    }

    /// Sets the compression.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Enables or disables the byte-shuffle filter.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// On-disk float type.
    pub fn dtype(&self) -> StorageDtype {
        self.dtype
    }

    /// Compression.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Whether the shuffle filter is enabled.
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if the deflate level exceeds 9.
    pub fn validate(&self) -> Result<(), IoError> {
        if let Compression::Deflate { level } = self.compression
            && level > 9
        {
            return Err(IoError::Validation {
                count: 1,
                details: format!("deflate level must be 0..=9, got {level}"),
            });
        }
        Ok(())
    }

    fn apply(&self, var: &mut netcdf::VariableMut<'_>) -> Result<(), IoError> {
        if let Compression::Deflate { level } = self.compression {
            var.set_compression(i32::from(level), self.shuffle)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Shared file setup
// ---------------------------------------------------------------------------

/// Add float data variable `name` over `dims` with the configured encoding.
fn add_data_variable<'f>(
    file: &'f mut netcdf::FileMut,
    name: &str,
    dims: &[&str],
    chunk: &[usize],
    encoding: &EncodingConfig,
) -> Result<netcdf::VariableMut<'f>, IoError> {
    let mut var = match encoding.dtype {
        StorageDtype::Float32 => file.add_variable::<f32>(name, dims)?,
        StorageDtype::Float64 => file.add_variable::<f64>(name, dims)?,
    };
    var.set_chunking(chunk)?;
    encoding.apply(&mut var)?;
    Ok(var)
}

/// Write `values` (any shape, logical order) at `extents` using the
/// configured dtype.
fn put_floats<E>(
    var: &mut netcdf::VariableMut<'_>,
    values: impl Iterator<Item = f64>,
    extents: E,
    dtype: StorageDtype,
) -> Result<(), IoError>
where
    E: TryInto<netcdf::Extents>,
    E::Error: Into<netcdf::Error>,
{
    match dtype {
        StorageDtype::Float32 => {
            let data: Vec<f32> = values.map(|v| v as f32).collect();
            var.put_values(&data, extents)?;
        }
        StorageDtype::Float64 => {
            let data: Vec<f64> = values.collect();
            var.put_values(&data, extents)?;
        }
    }
    Ok(())
}

/// Create `lat`/`lon` dimensions and coordinate variables.
fn write_grid_coords(file: &mut netcdf::FileMut, coords: &GridCoords) -> Result<(), IoError> {
    file.add_dimension("lat", coords.n_lat())?;
    file.add_dimension("lon", coords.n_lon())?;
    {
        let mut var = file.add_variable::<f64>("lat", &["lat"])?;
        var.put_attribute("standard_name", "latitude")?;
        var.put_attribute("units", "degrees_north")?;
        var.put_values(coords.lats(), ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("lon", &["lon"])?;
        var.put_attribute("standard_name", "longitude")?;
        var.put_attribute("units", "degrees_east")?;
        var.put_values(coords.lons(), ..)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// NetcdfEnsembleWriter
// ---------------------------------------------------------------------------

/// Streaming writer for `sampled_hail_magnitudes(ensemble, time, lat, lon)`.
///
/// Each pushed step is written straight into the chunked variable. Output
/// goes to `<path>.partial` and only replaces `path` in [`finish`]; a writer
/// dropped before that removes the temporary and leaves any existing file at
/// `path` untouched.
///
/// [`finish`]: NetcdfEnsembleWriter::finish
pub struct NetcdfEnsembleWriter {
    // Declared before `partial` so the handle closes before the temporary
    // is removed on drop.
    file: netcdf::FileMut,
    partial: PartialFile,
    layout: EnsembleLayout,
    encoding: EncodingConfig,
    next_step: usize,
}

impl std::fmt::Debug for NetcdfEnsembleWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetcdfEnsembleWriter")
            .field("path", &self.partial.path())
            .field("layout", &self.layout.dim())
            .field("next_step", &self.next_step)
            .finish()
    }
}

impl NetcdfEnsembleWriter {
    /// Create the temporary file with dimensions, coordinates and the empty
    /// chunked magnitude variable.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`] if the encoding is invalid or the file cannot be
    /// created.
    pub fn create(
        path: &Path,
        layout: &EnsembleLayout,
        encoding: &EncodingConfig,
    ) -> Result<Self, IoError> {
        encoding.validate()?;
        let partial = PartialFile::new(path)?;
        let mut file = netcdf::create(partial.path())?;

        let (ne, nt, _, _) = layout.dim();
        file.add_dimension("ensemble", ne)?;
        file.add_dimension("time", nt)?;
        write_grid_coords(&mut file, layout.coords())?;
        {
            let members: Vec<i32> = (0..ne).map(|i| i as i32).collect();
            let mut var = file.add_variable::<i32>("ensemble", &["ensemble"])?;
            var.put_attribute("long_name", "ensemble member")?;
            var.put_values(&members, ..)?;
        }
        {
            let hours: Vec<f64> = layout.times().iter().map(|&t| hours_since_epoch(t)).collect();
            let mut var = file.add_variable::<f64>("time", &["time"])?;
            var.put_attribute("standard_name", "time")?;
            var.put_attribute("units", EPOCH_HOURS_UNITS)?;
            var.put_attribute("calendar", "standard")?;
            var.put_values(&hours, ..)?;
        }
        {
            let mut var = add_data_variable(
                &mut file,
                MAGNITUDE_VAR,
                &["ensemble", "time", "lat", "lon"],
                &layout.chunk(),
                encoding,
            )?;
            var.put_attribute("long_name", "sampled hail magnitude")?;
        }
        file.add_attribute("title", "Synthetic hail magnitude ensemble")?;

        debug!(path = %partial.path().display(), dims = ?layout.dim(), chunk = ?layout.chunk(), "created ensemble file");
        Ok(Self {
            file,
            partial,
            layout: layout.clone(),
            encoding: *encoding,
            next_step: 0,
        })
    }

    /// Record a global text attribute (e.g. the gate model or seed).
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Netcdf`] if the attribute cannot be written.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), IoError> {
        self.file.add_attribute(name, value)?;
        Ok(())
    }

    /// Final destination of the file.
    pub fn target(&self) -> &Path {
        self.partial.target()
    }

    /// Close the file and move it over the target.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Sampler`] wrapping [`SamplerError::Incomplete`] if
    /// not every time step was written, or a NetCDF/filesystem error.
    pub fn finish(self) -> Result<PathBuf, IoError> {
        let expected = self.layout.n_times();
        if self.next_step != expected {
            return Err(SamplerError::Incomplete {
                expected,
                got: self.next_step,
            }
            .into());
        }
        let Self { file, partial, .. } = self;
        // Dropping the handle flushes and closes the file before the rename.
        drop(file);
        let path = partial.commit()?;
        info!(path = %path.display(), "wrote ensemble");
        Ok(path)
    }
}

impl EnsembleSink for NetcdfEnsembleWriter {
    type Error = IoError;

    fn push_step(&mut self, step: usize, member: ArrayView3<'_, f64>) -> Result<(), IoError> {
        self.layout.check_step(self.next_step, step, &member)?;
        let mut var = self
            .file
            .variable_mut(MAGNITUDE_VAR)
            .ok_or_else(|| IoError::MissingVariable {
                name: MAGNITUDE_VAR.to_string(),
                path: self.partial.path().to_path_buf(),
            })?;
        put_floats(
            &mut var,
            member.iter().copied(),
            (.., step, .., ..),
            self.encoding.dtype,
        )?;
        self.next_step += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 2-D outputs
// ---------------------------------------------------------------------------

/// Write `(lat, lon)` fields into one file, atomically.
fn write_grid_fields<'a>(
    path: &Path,
    coords: &GridCoords,
    fields: impl IntoIterator<Item = (String, String, ArrayView2<'a, f64>)>,
    global: &[(&str, String)],
    encoding: &EncodingConfig,
) -> Result<PathBuf, IoError> {
    encoding.validate()?;
    let partial = PartialFile::new(path)?;
    let mut file = netcdf::create(partial.path())?;
    write_grid_coords(&mut file, coords)?;
    let chunk = [coords.n_lat().max(1), coords.n_lon().max(1)];

    for (name, long_name, values) in fields {
        if values.dim() != coords.shape() {
            return Err(IoError::DimensionMismatch {
                name: name.clone(),
                expected: coords.n_lat() * coords.n_lon(),
                got: values.len(),
            });
        }
        let mut var = add_data_variable(&mut file, &name, &["lat", "lon"], &chunk, encoding)?;
        var.put_attribute("long_name", long_name.as_str())?;
        put_floats(&mut var, values.iter().copied(), .., encoding.dtype)?;
    }
    for (name, value) in global {
        file.add_attribute(name, value.as_str())?;
    }
    drop(file);
    partial.commit()
}

/// Write one per-cell parameter field (e.g. `shape` or `scale`).
///
/// # Errors
///
/// Returns [`IoError`] if the shape differs from `coords` or writing fails.
pub fn write_parameter_field(
    path: &Path,
    name: &str,
    coords: &GridCoords,
    values: ArrayView2<'_, f64>,
    encoding: &EncodingConfig,
) -> Result<PathBuf, IoError> {
    let long_name = format!("log-normal {name} parameter");
    let path = write_grid_fields(
        path,
        coords,
        [(name.to_string(), long_name, values)],
        &[],
        encoding,
    )?;
    info!(path = %path.display(), variable = name, "wrote parameter field");
    Ok(path)
}

/// Write a probability summary with one `(lat, lon)` variable per range.
///
/// `global` attributes are added to the file (e.g. the selection that was
/// summarised).
///
/// # Errors
///
/// Returns [`IoError`] if a field does not match `coords` or writing fails.
pub fn write_summary(
    path: &Path,
    summary: &ProbabilitySummary,
    coords: &GridCoords,
    global: &[(&str, String)],
    encoding: &EncodingConfig,
) -> Result<PathBuf, IoError> {
    let fields = summary.iter().map(|(range, field)| {
        (
            range.variable_name(),
            format!("probability of hail magnitude in {range}"),
            field,
        )
    });
    let path = write_grid_fields(path, coords, fields, global, encoding)?;
    info!(path = %path.display(), n_ranges = summary.len(), "wrote probability summary");
    Ok(path)
}
