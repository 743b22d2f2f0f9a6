//! Low-level NetCDF extraction helpers.

use std::ops::Range;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use ndarray::{Array2, Array3};
use netcdf::AttributeValue;

use crate::error::IoError;

/// Calendars whose dates map one-to-one onto the proleptic Gregorian
/// calendar used by `chrono`.
const GREGORIAN_CALENDARS: &[&str] = &["standard", "gregorian", "proleptic_gregorian"];

/// Open a NetCDF file at `path`, returning [`IoError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// Look up a variable by the first alias that exists.
///
/// Returns [`IoError::MissingVariable`] naming the first alias if none match.
pub(crate) fn find_variable<'f>(
    file: &'f netcdf::File,
    aliases: &[&str],
    path: &Path,
) -> Result<netcdf::Variable<'f>, IoError> {
    aliases
        .iter()
        .find_map(|&alias| file.variable(alias))
        .ok_or_else(|| IoError::MissingVariable {
            name: aliases.first().copied().unwrap_or("unknown").to_string(),
            path: path.to_path_buf(),
        })
}

/// Read a 1-D `f64` variable, trying each alias in order.
pub(crate) fn read_1d_f64(
    file: &netcdf::File,
    aliases: &[&str],
    path: &Path,
) -> Result<Vec<f64>, IoError> {
    let var = find_variable(file, aliases, path)?;
    Ok(var.get_values::<f64, _>(..)?)
}

/// Check that `var` has exactly the named number of dimensions with the
/// given lengths, in order.
pub(crate) fn check_dims(
    var: &netcdf::Variable<'_>,
    expected: &[(&str, usize)],
) -> Result<(), IoError> {
    let dims = var.dimensions();
    if dims.len() != expected.len() {
        return Err(IoError::DimensionMismatch {
            name: format!("{} dimensions", var.name()),
            expected: expected.len(),
            got: dims.len(),
        });
    }
    for (dim, &(name, len)) in dims.iter().zip(expected) {
        if dim.len() != len {
            return Err(IoError::DimensionMismatch {
                name: name.to_string(),
                expected: len,
                got: dim.len(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Attributes and CF packing
// ---------------------------------------------------------------------------

/// String attribute of a variable, if present and textual.
pub(crate) fn string_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<String> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// Scalar numeric attribute of a variable as `f64`.
pub(crate) fn numeric_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<f64> {
    let value = var.attribute_value(name)?.ok()?;
    match value {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Schar(v) => Some(f64::from(v)),
        AttributeValue::Uchar(v) => Some(f64::from(v)),
        AttributeValue::Ushort(v) => Some(f64::from(v)),
        AttributeValue::Uint(v) => Some(f64::from(v)),
        AttributeValue::Longlong(v) => Some(v as f64),
        AttributeValue::Ulonglong(v) => Some(v as f64),
        AttributeValue::Doubles(v) => v.first().copied(),
        AttributeValue::Floats(v) => v.first().map(|&x| f64::from(x)),
        _ => None,
    }
}

/// CF masking and packing attributes of a data variable.
///
/// Values equal to `_FillValue` or `missing_value` become NaN; the rest are
/// unpacked as `raw * scale_factor + add_offset`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Unpacking {
    missing: Vec<f64>,
    scale_factor: f64,
    add_offset: f64,
}

impl Unpacking {
    pub(crate) fn from_variable(var: &netcdf::Variable<'_>) -> Self {
        let missing = ["_FillValue", "missing_value"]
            .iter()
            .filter_map(|name| numeric_attribute(var, name))
            .collect();
        Self {
            missing,
            scale_factor: numeric_attribute(var, "scale_factor").unwrap_or(1.0),
            add_offset: numeric_attribute(var, "add_offset").unwrap_or(0.0),
        }
    }

    pub(crate) fn apply(&self, raw: f64) -> f64 {
        if raw.is_nan() || self.missing.iter().any(|&m| raw == m) {
            f64::NAN
        } else {
            raw * self.scale_factor + self.add_offset
        }
    }
}

/// Read a `(time, lat, lon)` hyperslab as unpacked `f64`.
pub(crate) fn read_slab_3d(
    var: &netcdf::Variable<'_>,
    t: Range<usize>,
    y: Range<usize>,
    x: Range<usize>,
) -> Result<Array3<f64>, IoError> {
    let shape = (t.len(), y.len(), x.len());
    let unpack = Unpacking::from_variable(var);
    let mut raw = var.get_values::<f64, _>((t, y, x))?;
    raw.iter_mut().for_each(|v| *v = unpack.apply(*v));
    Array3::from_shape_vec(shape, raw).map_err(|e| IoError::Netcdf {
        reason: format!("unexpected slab size for '{}': {e}", var.name()),
    })
}

/// Read a `(lat, lon)` hyperslab as unpacked `f64`.
pub(crate) fn read_slab_2d(
    var: &netcdf::Variable<'_>,
    y: Range<usize>,
    x: Range<usize>,
) -> Result<Array2<f64>, IoError> {
    let shape = (y.len(), x.len());
    let unpack = Unpacking::from_variable(var);
    let mut raw = var.get_values::<f64, _>((y, x))?;
    raw.iter_mut().for_each(|v| *v = unpack.apply(*v));
    Array2::from_shape_vec(shape, raw).map_err(|e| IoError::Netcdf {
        reason: format!("unexpected slab size for '{}': {e}", var.name()),
    })
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Read a CF time coordinate as timestamps.
pub(crate) fn read_time_axis(
    file: &netcdf::File,
    time_var: &str,
    path: &Path,
) -> Result<Vec<NaiveDateTime>, IoError> {
    let var = find_variable(file, &[time_var], path)?;
    let units = string_attribute(&var, "units").ok_or_else(|| IoError::InvalidTime {
        reason: format!("time variable '{time_var}' has no textual 'units' attribute"),
    })?;
    if let Some(calendar) = string_attribute(&var, "calendar") {
        let calendar = calendar.to_ascii_lowercase();
        if !GREGORIAN_CALENDARS.contains(&calendar.as_str()) {
            return Err(IoError::InvalidTime {
                reason: format!("unsupported calendar '{calendar}'"),
            });
        }
    }
    let (unit, epoch) = parse_time_units(&units)?;
    let offsets = var.get_values::<f64, _>(..)?;
    offsets_to_datetimes(epoch, unit, &offsets)
}

/// Parse `"<unit> since <reference>"` into the unit length and the epoch.
///
/// Units may be days, hours, minutes or seconds (singular, plural or
/// abbreviated). The reference accepts a date, a date with `HH:MM[:SS]`
/// separated by a space or `T`, and an optional trailing `Z`.
pub(crate) fn parse_time_units(units: &str) -> Result<(TimeDelta, NaiveDateTime), IoError> {
    let invalid = || IoError::InvalidTime {
        reason: format!("unexpected time units format: '{units}'"),
    };
    let (unit, reference) = units.split_once(" since ").ok_or_else(invalid)?;
    let unit = match unit.trim().to_ascii_lowercase().as_str() {
        "days" | "day" | "d" => TimeDelta::days(1),
        "hours" | "hour" | "hr" | "hrs" | "h" => TimeDelta::hours(1),
        "minutes" | "minute" | "min" | "mins" => TimeDelta::minutes(1),
        "seconds" | "second" | "sec" | "secs" | "s" => TimeDelta::seconds(1),
        _ => return Err(invalid()),
    };

    let reference = reference.trim().trim_end_matches('Z').trim();
    for fmt in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(reference, fmt) {
            return Ok((unit, dt));
        }
    }
    let date = NaiveDate::parse_from_str(reference, "%Y-%m-%d").map_err(|_| invalid())?;
    let epoch = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    Ok((unit, epoch))
}

/// Convert numeric offsets in `unit` from `epoch` into timestamps.
///
/// Offsets are resolved to the nearest millisecond.
pub(crate) fn offsets_to_datetimes(
    epoch: NaiveDateTime,
    unit: TimeDelta,
    offsets: &[f64],
) -> Result<Vec<NaiveDateTime>, IoError> {
    let unit_ms = unit.num_milliseconds() as f64;
    offsets
        .iter()
        .map(|&offset| {
            if !offset.is_finite() {
                return Err(IoError::InvalidTime {
                    reason: format!("non-finite time offset {offset}"),
                });
            }
            let ms = (offset * unit_ms).round() as i64;
            epoch
                .checked_add_signed(TimeDelta::milliseconds(ms))
                .ok_or_else(|| IoError::InvalidTime {
                    reason: format!("date overflow adding {offset} units to {epoch}"),
                })
        })
        .collect()
}

/// Hours elapsed since the Unix epoch, the encoding used for written files.
pub(crate) fn hours_since_epoch(t: NaiveDateTime) -> f64 {
    let epoch = NaiveDateTime::UNIX_EPOCH;
    (t - epoch).num_milliseconds() as f64 / 3_600_000.0
}

/// Units string matching [`hours_since_epoch`].
pub(crate) const EPOCH_HOURS_UNITS: &str = "hours since 1970-01-01 00:00:00";
