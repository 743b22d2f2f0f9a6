//! Generate command: sample a hail magnitude ensemble and stream it to NetCDF.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, info_span};

use hailgen_grid::GriddedField;
use hailgen_io::{NetcdfEnsembleWriter, ReaderConfig, read_field_multi, read_parameter_grid};
use hailgen_lognormal::estimate_parameters;
use hailgen_occurrence::{OccurrenceConfig, build_occurrence_field, presence_field};
use hailgen_sampler::{EnsembleLayout, GateModel, run_sampler};

use crate::cli::GenerateArgs;
use crate::config::HailgenConfig;
use crate::convert::{self, ParameterSource};

/// Run the generation pipeline.
pub fn run(args: GenerateArgs) -> Result<()> {
    let _cmd = info_span!("generate").entered();
    let config = HailgenConfig::load(args.config.as_deref())?;

    // 1. Resolve paths and build configs
    let inputs = convert::resolve_inputs(&config.io, &args.input)?;
    let output = args
        .output
        .clone()
        .or_else(|| config.io.output.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("no output path: set [io].output in config or use --output")
        })?;
    let window = convert::build_window(
        &config.window,
        args.start.as_deref(),
        args.end.as_deref(),
    )?;
    let bbox = convert::build_bbox(config.region.as_ref(), args.bbox)?;
    let logits_cfg = convert::build_reader_config(&config.io, &config.io.logits_var, window, bbox)?;
    let occ_cfg = convert::build_occurrence_config(&config.occurrence)?;
    let est_cfg = convert::build_estimator_config(&config.estimator)?;
    let sampler_cfg =
        convert::build_sampler_config(&config.sampler, args.ensemble_size, args.legacy_presence)?;
    let encoding = convert::build_encoding_config(&config.encoding)?;
    let source = convert::resolve_parameter_source(
        &config.parameters,
        &config.io,
        args.shape.as_ref(),
        args.scale.as_ref(),
    )?;
    if source == ParameterSource::NotProvided {
        bail!(
            "no distribution parameters: provide --shape and --scale, set both \
             [parameters].shape and [parameters].scale, or use source = \"estimate\""
        );
    }

    // 2. Occurrence probability field
    let occurrence = load_occurrence(&inputs, &logits_cfg, &occ_cfg)?;

    // 3. Historical record, shared by estimation and the presence gate
    let record = match (&source, sampler_cfg.gate()) {
        (ParameterSource::Estimate { variable }, _) => Some(historical_record(
            &inputs,
            &logits_cfg,
            variable.as_deref(),
            &occurrence,
        )?),
        (_, GateModel::Presence { .. }) => Some(historical_record(
            &inputs,
            &logits_cfg,
            config.io.historical_var.as_deref(),
            &occurrence,
        )?),
        _ => None,
    };

    // 4. Distribution parameters
    let params = match (&source, &record) {
        (ParameterSource::Precomputed(files), _) => {
            read_parameter_grid(files, &logits_cfg, occurrence.coords())
                .context("failed to load precomputed parameters")?
        }
        (ParameterSource::Estimate { .. }, Some(record)) => {
            estimate_parameters(record.values(), &est_cfg).context("parameter estimation failed")?
        }
        _ => bail!("no distribution parameters configured"),
    };

    // 5. Gate field
    let gate = match (sampler_cfg.gate(), &record) {
        (GateModel::Presence { .. }, Some(record)) => presence_field(record)
            .context("failed to build presence field")?
            .into_field(),
        _ => occurrence,
    };

    // 6. Seeded RNG
    let seed = args.seed.or(config.seed);
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    // 7. Stream the ensemble to disk
    let mut layout = EnsembleLayout::new(
        sampler_cfg.n_ensemble(),
        gate.times().to_vec(),
        gate.coords().clone(),
    )?;
    if let Some(chunk) = config.sampler.chunk {
        layout = layout.with_chunk(chunk)?;
    }
    let mut writer = NetcdfEnsembleWriter::create(&output, &layout, &encoding)
        .with_context(|| format!("failed to create output: {}", output.display()))?;
    writer.set_attribute("gate_model", sampler_cfg.gate().name())?;
    if let GateModel::Presence { zero_prob } = sampler_cfg.gate() {
        writer.set_attribute("zero_prob", &zero_prob.to_string())?;
    }
    writer.set_attribute(
        "seed",
        &seed.map_or_else(|| "entropy".to_string(), |s| s.to_string()),
    )?;

    let summary = run_sampler(&gate, &params, &sampler_cfg, &mut rng, &mut writer)
        .context("sampling failed")?;
    let path = writer
        .finish()
        .with_context(|| format!("failed to finalise output: {}", output.display()))?;
    info!(
        n_steps = summary.n_steps,
        n_events = summary.n_events,
        "ensemble complete"
    );

    println!("{}", path.display());
    Ok(())
}

/// Read log-odds and build the occurrence probability field.
pub(crate) fn load_occurrence(
    inputs: &[PathBuf],
    logits_cfg: &ReaderConfig,
    occ_cfg: &OccurrenceConfig,
) -> Result<GriddedField> {
    info!(n_files = inputs.len(), variable = logits_cfg.variable(), "reading log-odds");
    let logits = read_field_multi(inputs, logits_cfg).context("failed to read log-odds")?;
    info!(
        n_times = logits.n_times(),
        grid = ?logits.grid_shape(),
        "log-odds loaded"
    );
    let occurrence =
        build_occurrence_field(&logits, occ_cfg).context("failed to build occurrence field")?;
    Ok(occurrence.into_field())
}

/// The historical magnitude record: the named variable read on the same
/// window and grid as `occurrence`, or the occurrence field itself.
pub(crate) fn historical_record(
    inputs: &[PathBuf],
    logits_cfg: &ReaderConfig,
    variable: Option<&str>,
    occurrence: &GriddedField,
) -> Result<GriddedField> {
    let Some(variable) = variable else {
        return Ok(occurrence.clone());
    };
    let cfg = logits_cfg.clone().with_variable(variable);
    info!(variable, "reading historical record");
    let record = read_field_multi(inputs, &cfg)
        .with_context(|| format!("failed to read historical variable {variable:?}"))?;
    occurrence
        .coords()
        .ensure_matches(record.coords())
        .with_context(|| format!("historical variable {variable:?} is on a different grid"))?;
    Ok(record)
}
