use tracing_subscriber::EnvFilter;

/// All workspace crate targets that should receive log output.
const CRATE_TARGETS: &[&str] = &[
    "hailgen",
    "hailgen_climatology",
    "hailgen_grid",
    "hailgen_io",
    "hailgen_lognormal",
    "hailgen_occurrence",
    "hailgen_sampler",
    "hailgen_stats",
];

/// Targets whose per-step progress is shown at the default verbosity.
const PROGRESS_TARGETS: &[&str] = &["hailgen_sampler"];

/// Initialize tracing based on CLI verbosity level.
///
/// Mapping:
/// - 0 (none) -> warn, progress targets at info
/// - 1 (-v)   -> info
/// - 2 (-vv)  -> debug
/// - 3+ (-vvv)-> trace
///
/// `RUST_LOG` env var overrides the CLI flag if set.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Per-target filter directives for a verbosity level.
fn default_filter(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    CRATE_TARGETS
        .iter()
        .map(|t| {
            if verbosity == 0 && PROGRESS_TARGETS.contains(t) {
                format!("{t}=info")
            } else {
                format!("{t}={level}")
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
