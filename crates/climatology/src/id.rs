//! Naming of climatology outputs.

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDateTime, TimeDelta};
use hailgen_grid::TimeWindow;

use crate::error::ClimatologyError;

/// Identifies a summary by its year span and ensemble member span.
///
/// Displays as `{start_year}-{end_year}_ensemble_{first}-{last}`, for
/// example `2010-2023_ensemble_0-99`. Both spans are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryId {
    /// First year covered.
    pub start_year: i32,
    /// Last year covered.
    pub end_year: i32,
    /// First ensemble member label.
    pub ensemble_start: usize,
    /// Last ensemble member label.
    pub ensemble_end: usize,
}

impl SummaryId {
    /// Resolve the id for a selection.
    ///
    /// Years come from the window bounds when set and otherwise from the
    /// first and last selected timestamps. The window end is exclusive, so
    /// an end at `2024-01-01 00:00` names year 2023.
    ///
    /// # Errors
    ///
    /// Returns [`ClimatologyError::EmptySelection`] if `times` is empty.
    pub fn resolve(
        window: &TimeWindow,
        times: &[NaiveDateTime],
        members: RangeInclusive<usize>,
    ) -> Result<Self, ClimatologyError> {
        let (Some(first), Some(last)) = (times.first(), times.last()) else {
            return Err(ClimatologyError::EmptySelection {
                reason: format!("no time steps in {window}"),
            });
        };
        let start_year = window.start().unwrap_or(*first).year();
        let end_year = window
            .end()
            .map(|e| (e - TimeDelta::seconds(1)).year())
            .unwrap_or_else(|| last.year());
        Ok(Self {
            start_year,
            end_year,
            ensemble_start: *members.start(),
            ensemble_end: *members.end(),
        })
    }

    /// Output file name, `<id>.nc`.
    pub fn file_name(&self) -> String {
        format!("{self}.nc")
    }
}

impl fmt::Display for SummaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}_ensemble_{}-{}",
            self.start_year, self.end_year, self.ensemble_start, self.ensemble_end
        )
    }
}
