//! Latitude/longitude axes and bounding-box subsetting.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::GridError;

/// Coordinate tolerance used when comparing axes of two fields.
const COORD_TOL: f64 = 1e-9;

// ---------------------------------------------------------------------------
// GridCoords
// ---------------------------------------------------------------------------

/// 1-D latitude and longitude axes of a regular grid.
///
/// Axes may be ascending or descending but are expected to be monotonic;
/// bounding-box subsetting relies on this.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCoords {
    lats: Vec<f64>,
    lons: Vec<f64>,
}

impl GridCoords {
    /// Create coordinates from latitude and longitude axes.
    pub fn new(lats: Vec<f64>, lons: Vec<f64>) -> Self {
        Self { lats, lons }
    }

    /// Latitude axis.
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Longitude axis.
    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// Number of latitude rows.
    pub fn n_lat(&self) -> usize {
        self.lats.len()
    }

    /// Number of longitude columns.
    pub fn n_lon(&self) -> usize {
        self.lons.len()
    }

    /// `(n_lat, n_lon)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.lats.len(), self.lons.len())
    }

    /// Restrict both axes to the given index ranges.
    pub fn slice(&self, lat: Range<usize>, lon: Range<usize>) -> Self {
        Self {
            lats: self.lats[lat].to_vec(),
            lons: self.lons[lon].to_vec(),
        }
    }

    /// Check that `other` describes the same grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] on differing axis lengths and
    /// [`GridError::CoordinateMismatch`] when values differ.
    pub fn ensure_matches(&self, other: &GridCoords) -> Result<(), GridError> {
        check_axis("lat", &self.lats, &other.lats)?;
        check_axis("lon", &self.lons, &other.lons)
    }
}

fn check_axis(name: &str, a: &[f64], b: &[f64]) -> Result<(), GridError> {
    if a.len() != b.len() {
        return Err(GridError::DimensionMismatch {
            name: name.to_string(),
            expected: a.len(),
            got: b.len(),
        });
    }
    if a.iter().zip(b).any(|(x, y)| (x - y).abs() > COORD_TOL) {
        return Err(GridError::CoordinateMismatch {
            name: name.to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// BoundingBox
// ---------------------------------------------------------------------------

/// Closed latitude/longitude rectangle used to limit the working grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
}

impl BoundingBox {
    /// Create a bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidBoundingBox`] if any limit is non-finite
    /// or a minimum exceeds its maximum.
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Result<Self, GridError> {
        if ![lat_min, lat_max, lon_min, lon_max]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(GridError::InvalidBoundingBox {
                reason: "limits must be finite".to_string(),
            });
        }
        if lat_min > lat_max {
            return Err(GridError::InvalidBoundingBox {
                reason: format!("lat_min {lat_min} > lat_max {lat_max}"),
            });
        }
        if lon_min > lon_max {
            return Err(GridError::InvalidBoundingBox {
                reason: format!("lon_min {lon_min} > lon_max {lon_max}"),
            });
        }
        Ok(Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        })
    }

    /// Lower latitude limit.
    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    /// Upper latitude limit.
    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }

    /// Lower longitude limit.
    pub fn lon_min(&self) -> f64 {
        self.lon_min
    }

    /// Upper longitude limit.
    pub fn lon_max(&self) -> f64 {
        self.lon_max
    }

    /// Index ranges `(lat, lon)` of the cells inside the box.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyRegion`] when either axis has no value
    /// inside the box.
    pub fn index_ranges(&self, coords: &GridCoords) -> Result<(Range<usize>, Range<usize>), GridError> {
        let lat = axis_range(coords.lats(), self.lat_min, self.lat_max);
        let lon = axis_range(coords.lons(), self.lon_min, self.lon_max);
        match (lat, lon) {
            (Some(lat), Some(lon)) => Ok((lat, lon)),
            _ => Err(GridError::EmptyRegion {
                bbox: self.to_string(),
            }),
        }
    }
}

/// Contiguous index range of a monotonic axis covering `[lo, hi]`.
fn axis_range(axis: &[f64], lo: f64, hi: f64) -> Option<Range<usize>> {
    let inside = |v: &f64| *v >= lo && *v <= hi;
    let first = axis.iter().position(inside)?;
    let last = axis.iter().rposition(inside)?;
    Some(first..last + 1)
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat [{}, {}] lon [{}, {}]",
            self.lat_min, self.lat_max, self.lon_min, self.lon_max
        )
    }
}

/// Parses `lat_min,lat_max,lon_min,lon_max`.
impl FromStr for BoundingBox {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| GridError::InvalidBoundingBox {
                reason: format!("'{s}': {e}"),
            })?;
        match parts.as_slice() {
            &[a, b, c, d] => Self::new(a, b, c, d),
            _ => Err(GridError::InvalidBoundingBox {
                reason: format!("'{s}': expected 4 comma-separated values, got {}", parts.len()),
            }),
        }
    }
}
