//! # hailgen-io
//!
//! Reads gridded hail inputs from NetCDF and writes sampled ensembles,
//! parameter fields and probability summaries as chunked, compressed
//! NetCDF-4 files. Bridges file formats into the `ndarray`-based types of
//! the other hailgen crates.
//!
//! Every output is written to a `<name>.partial` sibling first and renamed
//! into place when complete.

mod ensemble;
mod error;
mod netcdf_read;
mod partial;
mod reader;
mod writer;

pub use ensemble::{EnsembleSelection, LoadedEnsemble, read_ensemble, read_ensemble_multi};
pub use error::IoError;
pub use partial::PARTIAL_SUFFIX;
pub use reader::{
    DEFAULT_LOGITS_VAR, ParameterFiles, ReaderConfig, read_field, read_field_multi,
    read_parameter_grid,
};
pub use writer::{
    Compression, DEFAULT_DEFLATE_LEVEL, EncodingConfig, MAGNITUDE_VAR, NetcdfEnsembleWriter,
    StorageDtype, write_parameter_field, write_summary,
};
