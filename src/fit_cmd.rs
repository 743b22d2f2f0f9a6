//! Fit command: estimate per-cell log-normal parameters and persist them.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use hailgen_io::write_parameter_field;
use hailgen_lognormal::estimate_parameters;

use crate::cli::FitArgs;
use crate::config::HailgenConfig;
use crate::convert;
use crate::generate::{historical_record, load_occurrence};

/// Run the parameter fitting pipeline.
pub fn run(args: FitArgs) -> Result<()> {
    let _cmd = info_span!("fit").entered();
    let config = HailgenConfig::load(args.config.as_deref())?;

    let inputs = convert::resolve_inputs(&config.io, &args.input)?;
    let window = convert::build_window(
        &config.window,
        args.start.as_deref(),
        args.end.as_deref(),
    )?;
    let bbox = convert::build_bbox(config.region.as_ref(), args.bbox)?;
    let logits_cfg = convert::build_reader_config(&config.io, &config.io.logits_var, window, bbox)?;
    let occ_cfg = convert::build_occurrence_config(&config.occurrence)?;
    let est_cfg = convert::build_estimator_config(&config.estimator)?;
    let encoding = convert::build_encoding_config(&config.encoding)?;

    let occurrence = load_occurrence(&inputs, &logits_cfg, &occ_cfg)?;
    let variable = args.variable.as_deref().or(config.io.historical_var.as_deref());
    let record = historical_record(&inputs, &logits_cfg, variable, &occurrence)?;

    let params =
        estimate_parameters(record.values(), &est_cfg).context("parameter estimation failed")?;
    info!(
        n_times = record.n_times(),
        n_valid = params.n_valid(),
        "parameters fitted"
    );

    let coords = record.coords();
    let shape = write_parameter_field(
        &args.shape,
        &config.parameters.shape_var,
        coords,
        params.shape(),
        &encoding,
    )
    .with_context(|| format!("failed to write shape field: {}", args.shape.display()))?;
    let scale = write_parameter_field(
        &args.scale,
        &config.parameters.scale_var,
        coords,
        params.scale(),
        &encoding,
    )
    .with_context(|| format!("failed to write scale field: {}", args.scale.display()))?;

    println!("{}", shape.display());
    println!("{}", scale.display());
    Ok(())
}
