//! Reading gridded `(time, lat, lon)` fields and parameter grids.

use std::ops::Range;
use std::path::{Path, PathBuf};

use hailgen_grid::{BoundingBox, GridCoords, GridError, GriddedField, TimeWindow};
use hailgen_lognormal::ParameterGrid;
use ndarray::Array2;
use tracing::{debug, info};

use crate::error::IoError;
use crate::netcdf_read;

/// Default name of the hail log-odds variable.
pub const DEFAULT_LOGITS_VAR: &str = "hail_logits";

// ---------------------------------------------------------------------------
// ReaderConfig
// ---------------------------------------------------------------------------

/// Configuration for reading one gridded variable from NetCDF files.
///
/// The time window and bounding box are applied while reading, so only the
/// selected hyperslab is ever loaded.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Name of the `(time, lat, lon)` data variable.
    variable: String,
    /// Aliases to try when looking up latitude coordinates.
    lat_aliases: Vec<String>,
    /// Aliases to try when looking up longitude coordinates.
    lon_aliases: Vec<String>,
    /// Name of the time coordinate variable.
    time_var: String,
    /// Time steps to keep.
    window: TimeWindow,
    /// Cells to keep, or the whole grid.
    bbox: Option<BoundingBox>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            variable: DEFAULT_LOGITS_VAR.into(),
            lat_aliases: vec!["lat".into(), "latitude".into(), "y".into()],
            lon_aliases: vec!["lon".into(), "longitude".into(), "x".into()],
            time_var: "time".into(),
            window: TimeWindow::unbounded(),
            bbox: None,
        }
    }
}

impl ReaderConfig {
    /// Set the data variable name.
    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        self.variable = name.into();
        self
    }

    /// Set the time coordinate name.
    pub fn with_time_var(mut self, name: impl Into<String>) -> Self {
        self.time_var = name.into();
        self
    }

    /// Restrict reading to a time window.
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Restrict reading to a bounding box, or `None` for the whole grid.
    pub fn with_bbox(mut self, bbox: Option<BoundingBox>) -> Self {
        self.bbox = bbox;
        self
    }

    /// Data variable name.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Time window.
    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// Bounding box.
    pub fn bbox(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }

    pub(crate) fn lat_aliases(&self) -> Vec<&str> {
        self.lat_aliases.iter().map(String::as_str).collect()
    }

    pub(crate) fn lon_aliases(&self) -> Vec<&str> {
        self.lon_aliases.iter().map(String::as_str).collect()
    }

    /// Validate that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if a variable name is empty.
    pub fn validate(&self) -> Result<(), IoError> {
        let mut problems = Vec::new();
        if self.variable.trim().is_empty() {
            problems.push("data variable name is empty".to_string());
        }
        if self.time_var.trim().is_empty() {
            problems.push("time variable name is empty".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: problems.len(),
                details: problems.join("; "),
            })
        }
    }
}

/// Spatial axes of a file and the part of them selected by a bounding box.
struct GridSelection {
    /// Full `(n_lat, n_lon)` of the file.
    full: (usize, usize),
    /// Coordinates of the selected cells.
    coords: GridCoords,
    lat: Range<usize>,
    lon: Range<usize>,
}

fn select_grid(
    file: &netcdf::File,
    config: &ReaderConfig,
    path: &Path,
) -> Result<GridSelection, IoError> {
    let lats = netcdf_read::read_1d_f64(file, &config.lat_aliases(), path)?;
    let lons = netcdf_read::read_1d_f64(file, &config.lon_aliases(), path)?;
    let full_coords = GridCoords::new(lats, lons);
    let (lat, lon) = match &config.bbox {
        Some(bbox) => bbox.index_ranges(&full_coords)?,
        None => (0..full_coords.n_lat(), 0..full_coords.n_lon()),
    };
    Ok(GridSelection {
        full: full_coords.shape(),
        coords: full_coords.slice(lat.clone(), lon.clone()),
        lat,
        lon,
    })
}

// ---------------------------------------------------------------------------
// read_field
// ---------------------------------------------------------------------------

/// Read the configured variable from one NetCDF file.
///
/// The variable must be laid out `(time, lat, lon)`. Fill and missing
/// values become NaN, and CF packing is undone.
///
/// # Errors
///
/// Returns [`IoError`] on missing files or variables, dimension mismatches,
/// unreadable time metadata, or [`GridError::EmptySelection`] /
/// [`GridError::EmptyRegion`] when the window or box selects nothing.
pub fn read_field(path: &Path, config: &ReaderConfig) -> Result<GriddedField, IoError> {
    config.validate()?;
    let file = netcdf_read::open_file(path)?;

    let times = netcdf_read::read_time_axis(&file, &config.time_var, path)?;
    let t = config.window.resolve(&times)?;
    let grid = select_grid(&file, config, path)?;

    let var = netcdf_read::find_variable(&file, &[config.variable.as_str()], path)?;
    netcdf_read::check_dims(
        &var,
        &[("time", times.len()), ("lat", grid.full.0), ("lon", grid.full.1)],
    )?;
    debug!(variable = %config.variable, ?t, lat = ?grid.lat, lon = ?grid.lon, "reading hyperslab");
    let values = netcdf_read::read_slab_3d(&var, t.clone(), grid.lat, grid.lon)?;

    let field = GriddedField::new(values, times[t].to_vec(), grid.coords)?;
    info!(
        path = %path.display(),
        variable = %config.variable,
        n_times = field.n_times(),
        n_lat = field.grid_shape().0,
        n_lon = field.grid_shape().1,
        "read field"
    );
    Ok(field)
}

/// Read the configured variable from several files and join them along time.
///
/// Files are taken in the given order. A file with no time step inside the
/// window is skipped; all others must share one grid and together keep time
/// strictly increasing.
///
/// # Errors
///
/// Returns [`GridError::EmptySelection`] if no file contributes a time step,
/// or the first read or concatenation error otherwise.
pub fn read_field_multi(paths: &[PathBuf], config: &ReaderConfig) -> Result<GriddedField, IoError> {
    let mut parts = Vec::with_capacity(paths.len());
    for path in paths {
        match read_field(path, config) {
            Ok(field) => parts.push(field),
            Err(IoError::Grid(GridError::EmptySelection { .. })) => {
                debug!(path = %path.display(), window = %config.window, "no time steps in window, skipping file");
            }
            Err(e) => return Err(e),
        }
    }
    if parts.is_empty() {
        return Err(GridError::EmptySelection {
            window: config.window.to_string(),
        }
        .into());
    }
    Ok(GriddedField::concat_time(parts)?)
}

// ---------------------------------------------------------------------------
// Parameter grids
// ---------------------------------------------------------------------------

/// Locations of precomputed shape and scale fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterFiles {
    /// File holding the shape field.
    pub shape_path: PathBuf,
    /// File holding the scale field.
    pub scale_path: PathBuf,
    /// Variable name of the shape field.
    pub shape_var: String,
    /// Variable name of the scale field.
    pub scale_var: String,
}

impl ParameterFiles {
    /// Parameter files using the default variable names `shape` and `scale`.
    pub fn new(shape_path: impl Into<PathBuf>, scale_path: impl Into<PathBuf>) -> Self {
        Self {
            shape_path: shape_path.into(),
            scale_path: scale_path.into(),
            shape_var: "shape".into(),
            scale_var: "scale".into(),
        }
    }
}

/// Read one `(lat, lon)` variable, restricted to `bbox`.
fn read_parameter(
    path: &Path,
    var_name: &str,
    config: &ReaderConfig,
) -> Result<(GridCoords, Array2<f64>), IoError> {
    let file = netcdf_read::open_file(path)?;
    let grid = select_grid(&file, config, path)?;
    let var = netcdf_read::find_variable(&file, &[var_name], path)?;
    netcdf_read::check_dims(&var, &[("lat", grid.full.0), ("lon", grid.full.1)])?;
    let values = netcdf_read::read_slab_2d(&var, grid.lat, grid.lon)?;
    Ok((grid.coords, values))
}

/// Load precomputed shape and scale fields onto the grid `expected`.
///
/// Both files are subset with the reader's bounding box and must then match
/// `expected` exactly. Missing values are treated as "no distribution".
///
/// # Errors
///
/// Returns [`IoError`] on read failures, a grid error if either field's
/// coordinates differ from `expected`, and a parameter error for negative
/// values.
pub fn read_parameter_grid(
    files: &ParameterFiles,
    config: &ReaderConfig,
    expected: &GridCoords,
) -> Result<ParameterGrid, IoError> {
    let (shape_coords, shape) = read_parameter(&files.shape_path, &files.shape_var, config)?;
    expected.ensure_matches(&shape_coords)?;
    let (scale_coords, scale) = read_parameter(&files.scale_path, &files.scale_var, config)?;
    expected.ensure_matches(&scale_coords)?;
    let grid = ParameterGrid::new(shape, scale)?;
    info!(
        shape = %files.shape_path.display(),
        scale = %files.scale_path.display(),
        n_valid = grid.n_valid(),
        "loaded precomputed parameters"
    );
    Ok(grid)
}
