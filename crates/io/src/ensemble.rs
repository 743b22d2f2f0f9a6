//! Reading ensembles back from NetCDF.

use std::ops::{Range, RangeInclusive};
use std::path::{Path, PathBuf};

use hailgen_grid::{GridCoords, GridError, TimeWindow};
use hailgen_sampler::{EnsembleArray, EnsembleLayout};
use ndarray::{Array4, ArrayView4, Axis, concatenate};
use tracing::{debug, info};

use crate::error::IoError;
use crate::netcdf_read;
use crate::writer::MAGNITUDE_VAR;

/// Which members and time steps to load from an ensemble file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnsembleSelection {
    /// Inclusive range of ensemble member labels, or every member.
    pub members: Option<RangeInclusive<usize>>,
    /// Time steps to keep.
    pub window: TimeWindow,
}

/// An ensemble together with the labels of its members.
#[derive(Debug, Clone)]
pub struct LoadedEnsemble {
    /// Magnitudes and layout. Layout member indices start at 0.
    pub ensemble: EnsembleArray,
    /// Original member label of each layout index.
    pub member_labels: Vec<usize>,
}

impl LoadedEnsemble {
    /// First and last member label.
    pub fn member_span(&self) -> Option<RangeInclusive<usize>> {
        Some(*self.member_labels.first()?..=*self.member_labels.last()?)
    }
}

/// Member labels as stored, which must be non-negative and strictly
/// increasing so that a label range maps onto one contiguous hyperslab.
fn member_labels(raw: Vec<i64>, path: &Path) -> Result<Vec<usize>, IoError> {
    let labels = raw
        .into_iter()
        .map(usize::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| IoError::Validation {
            count: 1,
            details: format!("negative ensemble label in {}", path.display()),
        })?;
    if let Some(i) = labels.windows(2).position(|w| w[1] <= w[0]) {
        return Err(IoError::Validation {
            count: 1,
            details: format!(
                "ensemble labels in {} are not strictly increasing ({} follows {})",
                path.display(),
                labels[i + 1],
                labels[i]
            ),
        });
    }
    Ok(labels)
}

/// Contiguous positions of the labels inside `selection`. `labels` must be
/// strictly increasing.
fn member_positions(labels: &[usize], selection: Option<&RangeInclusive<usize>>) -> Option<Range<usize>> {
    match selection {
        None if labels.is_empty() => None,
        None => Some(0..labels.len()),
        Some(sel) => {
            let first = labels.iter().position(|l| sel.contains(l))?;
            let last = labels.iter().rposition(|l| sel.contains(l))?;
            Some(first..last + 1)
        }
    }
}

/// Read the selected part of one ensemble file.
///
/// # Errors
///
/// Returns [`IoError::EmptySelection`] if no member label lies in the
/// selection, [`IoError::Validation`] if the labels are not strictly
/// increasing, a grid error if the window selects no time step, and the
/// usual NetCDF errors otherwise.
pub fn read_ensemble(path: &Path, selection: &EnsembleSelection) -> Result<LoadedEnsemble, IoError> {
    let file = netcdf_read::open_file(path)?;

    let labels = {
        let var = netcdf_read::find_variable(&file, &["ensemble"], path)?;
        member_labels(var.get_values::<i64, _>(..)?, path)?
    };
    let members = member_positions(&labels, selection.members.as_ref()).ok_or_else(|| {
        IoError::EmptySelection {
            reason: format!("no ensemble members in {:?} in {}", selection.members, path.display()),
        }
    })?;

    let times = netcdf_read::read_time_axis(&file, "time", path)?;
    let t = selection.window.resolve(&times)?;
    let lats = netcdf_read::read_1d_f64(&file, &["lat", "latitude"], path)?;
    let lons = netcdf_read::read_1d_f64(&file, &["lon", "longitude"], path)?;
    let coords = GridCoords::new(lats, lons);

    let var = netcdf_read::find_variable(&file, &[MAGNITUDE_VAR], path)?;
    netcdf_read::check_dims(
        &var,
        &[
            ("ensemble", labels.len()),
            ("time", times.len()),
            ("lat", coords.n_lat()),
            ("lon", coords.n_lon()),
        ],
    )?;
    let shape = (members.len(), t.len(), coords.n_lat(), coords.n_lon());
    debug!(?members, ?t, "reading ensemble hyperslab");
    let raw = var.get_values::<f64, _>((members.clone(), t.clone(), .., ..))?;
    let values = Array4::from_shape_vec(shape, raw).map_err(|e| IoError::Netcdf {
        reason: format!("unexpected slab size for '{MAGNITUDE_VAR}': {e}"),
    })?;

    let layout = EnsembleLayout::new(members.len(), times[t].to_vec(), coords)?;
    let loaded = LoadedEnsemble {
        ensemble: EnsembleArray::new(values, layout)?,
        member_labels: labels[members].to_vec(),
    };
    info!(
        path = %path.display(),
        n_ensemble = loaded.member_labels.len(),
        n_times = loaded.ensemble.layout().n_times(),
        "read ensemble"
    );
    Ok(loaded)
}

/// Read several ensemble files and join them along time.
///
/// Files with no time step in the window are skipped. The remaining files
/// must share member labels and grid.
///
/// # Errors
///
/// Returns [`GridError::EmptySelection`] if no file contributes a time step,
/// or a dimension/coordinate error if the files disagree.
pub fn read_ensemble_multi(
    paths: &[PathBuf],
    selection: &EnsembleSelection,
) -> Result<LoadedEnsemble, IoError> {
    let mut parts = Vec::with_capacity(paths.len());
    for path in paths {
        match read_ensemble(path, selection) {
            Ok(part) => parts.push(part),
            Err(IoError::Grid(GridError::EmptySelection { .. })) => {
                debug!(path = %path.display(), "no time steps in window, skipping file");
            }
            Err(e) => return Err(e),
        }
    }
    let mut iter = parts.into_iter();
    let Some(first) = iter.next() else {
        return Err(GridError::EmptySelection {
            window: selection.window.to_string(),
        }
        .into());
    };
    let rest: Vec<LoadedEnsemble> = iter.collect();
    if rest.is_empty() {
        return Ok(first);
    }

    let mut times = first.ensemble.times().to_vec();
    for part in &rest {
        if part.member_labels != first.member_labels {
            return Err(IoError::DimensionMismatch {
                name: "ensemble".to_string(),
                expected: first.member_labels.len(),
                got: part.member_labels.len(),
            });
        }
        first
            .ensemble
            .layout()
            .coords()
            .ensure_matches(part.ensemble.layout().coords())?;
        times.extend_from_slice(part.ensemble.times());
    }
    let views: Vec<ArrayView4<'_, f64>> = std::iter::once(first.ensemble.values())
        .chain(rest.iter().map(|p| p.ensemble.values()))
        .collect();
    let values = concatenate(Axis(1), &views).map_err(|e| IoError::Netcdf {
        reason: format!("cannot join ensembles along time: {e}"),
    })?;
    let layout = EnsembleLayout::new(
        first.member_labels.len(),
        times,
        first.ensemble.layout().coords().clone(),
    )?;
    Ok(LoadedEnsemble {
        ensemble: EnsembleArray::new(values, layout)?,
        member_labels: first.member_labels,
    })
}
