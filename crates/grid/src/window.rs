//! Time windows over a strictly increasing time coordinate.

use std::fmt;
use std::ops::Range;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::GridError;

/// An optionally bounded time window.
///
/// `start` is inclusive and `end` is exclusive. A date-only end bound such
/// as `2023-12-31` is widened to cover the whole day, so the window
/// `2010-01-01..2023-12-31` includes every timestamp on 31 December.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
}

impl TimeWindow {
    /// A window with no bounds; selects every time step.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Create a window from explicit bounds (`start` inclusive, `end` exclusive).
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidWindow`] if both bounds are set and
    /// `end <= start`.
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Result<Self, GridError> {
        if let (Some(s), Some(e)) = (start, end)
            && e <= s
        {
            return Err(GridError::InvalidWindow {
                reason: format!("end {e} is not after start {s}"),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse a window from optional date strings.
    ///
    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD HH:MM:SS`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDate`] on unparseable input and
    /// [`GridError::InvalidWindow`] if the end does not follow the start.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, GridError> {
        let start = start.map(|s| parse_bound(s, false)).transpose()?;
        let end = end.map(|s| parse_bound(s, true)).transpose()?;
        Self::new(start, end)
    }

    /// Inclusive start bound, if any.
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.start
    }

    /// Exclusive end bound, if any.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end
    }

    /// Returns `true` if `t` lies inside the window.
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start.is_none_or(|s| t >= s) && self.end.is_none_or(|e| t < e)
    }

    /// Resolve the window against a strictly increasing time coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptySelection`] when no timestamp falls inside
    /// the window.
    pub fn resolve(&self, times: &[NaiveDateTime]) -> Result<Range<usize>, GridError> {
        let lo = match self.start {
            Some(s) => times.partition_point(|&t| t < s),
            None => 0,
        };
        let hi = match self.end {
            Some(e) => times.partition_point(|&t| t < e),
            None => times.len(),
        };
        if lo >= hi {
            return Err(GridError::EmptySelection {
                window: self.to_string(),
            });
        }
        Ok(lo..hi)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start {
            Some(s) => write!(f, "[{s}")?,
            None => write!(f, "[-inf")?,
        }
        match self.end {
            Some(e) => write!(f, ", {e})"),
            None => write!(f, ", +inf)"),
        }
    }
}

/// Parse one bound. Date-only end bounds advance to the following midnight.
fn parse_bound(s: &str, is_end: bool) -> Result<NaiveDateTime, GridError> {
    let s = s.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| GridError::InvalidDate {
        input: s.to_string(),
    })?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| GridError::InvalidDate {
        input: s.to_string(),
    })?;
    if is_end {
        midnight
            .checked_add_signed(TimeDelta::days(1))
            .ok_or_else(|| GridError::InvalidDate {
                input: s.to_string(),
            })
    } else {
        Ok(midnight)
    }
}

/// Check that `times` is strictly increasing.
///
/// # Errors
///
/// Returns [`GridError::NonMonotonicTime`] at the first offending index.
pub fn ensure_strictly_increasing(times: &[NaiveDateTime]) -> Result<(), GridError> {
    match times.windows(2).position(|w| w[1] <= w[0]) {
        Some(i) => Err(GridError::NonMonotonicTime { index: i + 1 }),
        None => Ok(()),
    }
}
