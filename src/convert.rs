//! Pure conversion functions: TOML config structs -> crate API config types.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::config::*;

use hailgen_climatology::{ClimatologyConfig, MagnitudeRange};
use hailgen_grid::{BoundingBox, TimeWindow};
use hailgen_io::{Compression, EncodingConfig, ParameterFiles, ReaderConfig, StorageDtype};
use hailgen_lognormal::EstimatorConfig;
use hailgen_occurrence::OccurrenceConfig;
use hailgen_sampler::{GateModel, SamplerConfig};

/// Where the per-cell distribution parameters come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSource {
    /// Load shape and scale from previously written files.
    Precomputed(ParameterFiles),
    /// Fit from a historical variable, or from the occurrence field when
    /// `variable` is `None`.
    Estimate { variable: Option<String> },
    /// Nothing usable was configured.
    NotProvided,
}

/// Builds the time window; CLI bounds override the `[window]` section.
pub fn build_window(
    window: &WindowToml,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<TimeWindow> {
    let start = start.or(window.start.as_deref());
    let end = end.or(window.end.as_deref());
    Ok(TimeWindow::parse(start, end)?)
}

/// Builds the bounding box; a CLI box overrides the `[region]` section.
pub fn build_bbox(
    region: Option<&RegionToml>,
    cli: Option<BoundingBox>,
) -> Result<Option<BoundingBox>> {
    if cli.is_some() {
        return Ok(cli);
    }
    match region {
        Some(r) => Ok(Some(BoundingBox::new(
            r.lat_min, r.lat_max, r.lon_min, r.lon_max,
        )?)),
        None => Ok(None),
    }
}

/// Resolves input files; CLI paths replace `[io].inputs` entirely.
pub fn resolve_inputs(io: &IoToml, cli: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let inputs = if cli.is_empty() { &io.inputs } else { cli };
    if inputs.is_empty() {
        bail!("no input path: set [io].inputs in config or use --input");
    }
    Ok(inputs.to_vec())
}

/// Builds a [`ReaderConfig`] for `variable` with the shared window and box.
pub fn build_reader_config(
    io: &IoToml,
    variable: &str,
    window: TimeWindow,
    bbox: Option<BoundingBox>,
) -> Result<ReaderConfig> {
    let cfg = ReaderConfig::default()
        .with_variable(variable)
        .with_time_var(&io.time_var)
        .with_window(window)
        .with_bbox(bbox);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds an [`OccurrenceConfig`] from the TOML occurrence configuration.
pub fn build_occurrence_config(occ: &OccurrenceToml) -> Result<OccurrenceConfig> {
    let cfg = OccurrenceConfig::new().with_threshold(occ.threshold);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds an [`EstimatorConfig`] from the TOML estimator configuration.
pub fn build_estimator_config(est: &EstimatorToml) -> Result<EstimatorConfig> {
    let cfg = EstimatorConfig::new()
        .with_min_samples(est.min_samples)
        .with_floor(est.floor);
    cfg.validate()?;
    Ok(cfg)
}

/// Parses a gate model name. `legacy_presence` forces the presence gate.
pub fn parse_gate(sampler: &SamplerToml, legacy_presence: bool) -> Result<GateModel> {
    if legacy_presence {
        return Ok(GateModel::Presence {
            zero_prob: sampler.zero_prob,
        });
    }
    match sampler.gate.to_lowercase().as_str() {
        "probability" => Ok(GateModel::Probability),
        "presence" => Ok(GateModel::Presence {
            zero_prob: sampler.zero_prob,
        }),
        other => bail!("unknown gate model: {other:?}"),
    }
}

/// Builds a [`SamplerConfig`]; `n_ensemble` overrides `[sampler].n_ensemble`.
pub fn build_sampler_config(
    sampler: &SamplerToml,
    n_ensemble: Option<usize>,
    legacy_presence: bool,
) -> Result<SamplerConfig> {
    let gate = parse_gate(sampler, legacy_presence)?;
    let cfg = SamplerConfig::new(n_ensemble.unwrap_or(sampler.n_ensemble)).with_gate(gate);
    cfg.validate()?;
    Ok(cfg)
}

/// Parses a storage dtype name into the corresponding enum variant.
pub fn parse_dtype(s: &str) -> Result<StorageDtype> {
    match s.to_lowercase().as_str() {
        "float32" | "f32" => Ok(StorageDtype::Float32),
        "float64" | "f64" => Ok(StorageDtype::Float64),
        other => bail!("unknown storage dtype: {other:?}"),
    }
}

/// Parses a compression algorithm name string into the corresponding enum variant.
pub fn parse_compression(s: &str, level: u8) -> Result<Compression> {
    match s.to_lowercase().as_str() {
        "none" => Ok(Compression::None),
        "deflate" | "zlib" => Ok(Compression::Deflate { level }),
        other => bail!("unknown compression: {other:?}"),
    }
}

/// Builds an [`EncodingConfig`] from the TOML encoding configuration.
pub fn build_encoding_config(enc: &EncodingToml) -> Result<EncodingConfig> {
    let cfg = EncodingConfig::default()
        .with_dtype(parse_dtype(&enc.dtype)?)
        .with_compression(parse_compression(&enc.compression, enc.deflate_level)?)
        .with_shuffle(enc.shuffle);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds a [`ClimatologyConfig`] from the TOML climatology configuration.
pub fn build_climatology_config(clim: &ClimatologyToml) -> Result<ClimatologyConfig> {
    let mut cfg = ClimatologyConfig::new();
    if let Some(ref pairs) = clim.ranges {
        let ranges = pairs
            .iter()
            .map(|&[low, high]| MagnitudeRange::new(low, high))
            .collect::<Result<Vec<_>, _>>()?;
        cfg = cfg.with_ranges(ranges);
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Resolves the parameter source.
///
/// `--shape`/`--scale` on the CLI take precedence. Otherwise
/// `[parameters].source` decides; `"precomputed"` without both paths yields
/// [`ParameterSource::NotProvided`].
pub fn resolve_parameter_source(
    params: &ParametersToml,
    io: &IoToml,
    cli_shape: Option<&PathBuf>,
    cli_scale: Option<&PathBuf>,
) -> Result<ParameterSource> {
    let files = |shape: &PathBuf, scale: &PathBuf| {
        let mut files = ParameterFiles::new(shape, scale);
        files.shape_var = params.shape_var.clone();
        files.scale_var = params.scale_var.clone();
        ParameterSource::Precomputed(files)
    };
    match (cli_shape, cli_scale) {
        (Some(shape), Some(scale)) => return Ok(files(shape, scale)),
        (None, None) => {}
        _ => bail!("--shape and --scale must be given together"),
    }
    match params.source.to_lowercase().as_str() {
        "estimate" => Ok(ParameterSource::Estimate {
            variable: io.historical_var.clone(),
        }),
        "precomputed" => match (&params.shape, &params.scale) {
            (Some(shape), Some(scale)) => Ok(files(shape, scale)),
            _ => Ok(ParameterSource::NotProvided),
        },
        other => bail!("unknown parameter source: {other:?}"),
    }
}

/// Builds an inclusive member-label range from optional CLI bounds.
pub fn build_member_range(
    start: Option<usize>,
    end: Option<usize>,
) -> Result<Option<RangeInclusive<usize>>> {
    match (start, end) {
        (None, None) => Ok(None),
        (s, e) => {
            let (s, e) = (s.unwrap_or(0), e.unwrap_or(usize::MAX));
            if e < s {
                bail!("ensemble range is empty: start {s} > end {e}");
            }
            Ok(Some(s..=e))
        }
    }
}
