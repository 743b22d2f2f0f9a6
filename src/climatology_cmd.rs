//! Climatology command: per-range occurrence probabilities of an ensemble.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use hailgen_climatology::{SummaryId, aggregate};
use hailgen_io::{EnsembleSelection, read_ensemble_multi, write_summary};

use crate::cli::ClimatologyArgs;
use crate::config::HailgenConfig;
use crate::convert;

/// Run the climatological aggregation.
pub fn run(args: ClimatologyArgs) -> Result<()> {
    let _cmd = info_span!("climatology").entered();
    let config = HailgenConfig::load(args.config.as_deref())?;

    let window = convert::build_window(
        &config.window,
        args.start.as_deref(),
        args.end.as_deref(),
    )?;
    let members = convert::build_member_range(args.ensemble_start, args.ensemble_end)?;
    let clim_cfg = convert::build_climatology_config(&config.climatology)?;
    let encoding = convert::build_encoding_config(&config.encoding)?;

    let selection = EnsembleSelection { members, window };
    info!(n_files = args.input.len(), "reading ensemble");
    let loaded = read_ensemble_multi(&args.input, &selection).context("failed to read ensemble")?;
    let ensemble = &loaded.ensemble;
    info!(dims = ?ensemble.layout().dim(), "ensemble loaded");

    let summary = aggregate(ensemble.values(), &clim_cfg).context("aggregation failed")?;

    let span = loaded
        .member_span()
        .context("ensemble selection contains no members")?;
    let id = SummaryId::resolve(&window, ensemble.times(), span.clone())?;
    let path = args.output_dir.join(id.file_name());

    let global = [
        ("summary_id", id.to_string()),
        ("ensemble_members", format!("{}-{}", span.start(), span.end())),
        ("time_window", window.to_string()),
    ];
    let path = write_summary(
        &path,
        &summary,
        ensemble.layout().coords(),
        &global,
        &encoding,
    )
    .with_context(|| format!("failed to write summary: {}", path.display()))?;

    println!("{}", path.display());
    Ok(())
}
