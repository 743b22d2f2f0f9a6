//! # hailgen-grid
//!
//! Shared data model for gridded hail fields: `(time, lat, lon)` arrays with
//! their coordinates, half-open time windows, and bounding boxes used to keep
//! the working grid small.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `field` | `GriddedField` with shape and time-ordering invariants |
//! | `coords` | Latitude/longitude axes and bounding-box subsetting |
//! | `window` | Time windows resolved against a time coordinate |
//! | `error` | Error types |

mod coords;
mod error;
mod field;
mod window;

pub use coords::{BoundingBox, GridCoords};
pub use error::GridError;
pub use field::GriddedField;
pub use window::{TimeWindow, ensure_strictly_increasing};
