//! Per-cell range probabilities over ensemble and time.

use ndarray::{Array2, ArrayView2, ArrayView4, Zip};
use rayon::prelude::*;
use tracing::info;

use crate::config::ClimatologyConfig;
use crate::error::ClimatologyError;
use crate::range::MagnitudeRange;

/// One `(lat, lon)` probability field per magnitude range.
#[derive(Debug, Clone)]
pub struct ProbabilitySummary {
    ranges: Vec<MagnitudeRange>,
    fields: Vec<Array2<f64>>,
}

impl ProbabilitySummary {
    /// The summarised ranges, in configuration order.
    pub fn ranges(&self) -> &[MagnitudeRange] {
        &self.ranges
    }

    /// Number of ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns `true` if the summary holds no ranges.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Probability field for the `i`-th range.
    pub fn field(&self, i: usize) -> Option<ArrayView2<'_, f64>> {
        self.fields.get(i).map(|f| f.view())
    }

    /// Probability field by variable name (e.g. `probability_1_2`).
    pub fn field_by_name(&self, name: &str) -> Option<ArrayView2<'_, f64>> {
        self.ranges
            .iter()
            .position(|r| r.variable_name() == name)
            .and_then(|i| self.field(i))
    }

    /// `(range, field)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&MagnitudeRange, ArrayView2<'_, f64>)> {
        self.ranges.iter().zip(self.fields.iter().map(|f| f.view()))
    }
}

/// Fraction of `(member, time)` samples in each range, per cell.
///
/// `ensemble` is indexed `(ensemble, time, lat, lon)`. NaN magnitudes fall
/// outside every range but still count in the denominator.
///
/// # Errors
///
/// Returns [`ClimatologyError::EmptySelection`] if the ensemble or time axis
/// is empty, and [`ClimatologyError::InvalidConfig`] for an invalid config.
pub fn aggregate(
    ensemble: ArrayView4<'_, f64>,
    config: &ClimatologyConfig,
) -> Result<ProbabilitySummary, ClimatologyError> {
    config.validate()?;
    let (ne, nt, ny, nx) = ensemble.dim();
    if ne == 0 || nt == 0 {
        return Err(ClimatologyError::EmptySelection {
            reason: format!("{ne} ensemble members and {nt} time steps selected"),
        });
    }
    let n_samples = (ne * nt) as f64;

    let fields: Vec<Array2<f64>> = config
        .ranges()
        .par_iter()
        .map(|range| {
            let mut counts = Array2::<f64>::zeros((ny, nx));
            for member in ensemble.outer_iter() {
                for step in member.outer_iter() {
                    Zip::from(&mut counts).and(&step).for_each(|c, &m| {
                        if range.contains(m) {
                            *c += 1.0;
                        }
                    });
                }
            }
            counts.mapv_inplace(|c| c / n_samples);
            counts
        })
        .collect();

    info!(
        n_ensemble = ne,
        n_times = nt,
        n_ranges = fields.len(),
        "aggregated range probabilities"
    );
    Ok(ProbabilitySummary {
        ranges: config.ranges().to_vec(),
        fields,
    })
}
