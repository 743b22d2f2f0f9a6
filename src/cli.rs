use std::path::PathBuf;

use clap::{Parser, Subcommand};

use hailgen_grid::BoundingBox;

/// Hailgen stochastic severe-hail ensemble generator.
#[derive(Parser)]
#[command(
    name = "hailgen",
    version,
    about = "Stochastic severe-hail ensemble generator"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Sample a hail magnitude ensemble from historical log-odds.
    Generate(GenerateArgs),
    /// Estimate per-cell log-normal parameters and write them to disk.
    Fit(FitArgs),
    /// Summarise an ensemble into per-range occurrence probabilities.
    Climatology(ClimatologyArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(clap::Args)]
pub struct GenerateArgs {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// First date to sample (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub start: Option<String>,

    /// Last date to sample (YYYY-MM-DD), inclusive of the whole day.
    #[arg(long)]
    pub end: Option<String>,

    /// Number of ensemble members per time step.
    #[arg(short = 'n', long)]
    pub ensemble_size: Option<usize>,

    /// Input NetCDF file(s), concatenated along time in the given order.
    #[arg(short, long)]
    pub input: Vec<PathBuf>,

    /// Output NetCDF path for the ensemble.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Precomputed shape parameter file (requires --scale).
    #[arg(long, requires = "scale")]
    pub shape: Option<PathBuf>,

    /// Precomputed scale parameter file (requires --shape).
    #[arg(long, requires = "shape")]
    pub scale: Option<PathBuf>,

    /// Override global RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Restrict the grid to `lat_min,lat_max,lon_min,lon_max`.
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: Option<BoundingBox>,

    /// Gate on historical presence instead of occurrence probability.
    #[arg(long)]
    pub legacy_presence: bool,
}

/// Arguments for the `fit` subcommand.
#[derive(clap::Args)]
pub struct FitArgs {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Input NetCDF file(s), concatenated along time in the given order.
    #[arg(short, long)]
    pub input: Vec<PathBuf>,

    /// First date of the historical record (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<String>,

    /// Last date of the historical record (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<String>,

    /// Restrict the grid to `lat_min,lat_max,lon_min,lon_max`.
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: Option<BoundingBox>,

    /// Historical magnitude variable. Defaults to the occurrence field.
    #[arg(long)]
    pub variable: Option<String>,

    /// Output path for the shape field.
    #[arg(long)]
    pub shape: PathBuf,

    /// Output path for the scale field.
    #[arg(long)]
    pub scale: PathBuf,
}

/// Arguments for the `climatology` subcommand.
#[derive(clap::Args)]
pub struct ClimatologyArgs {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ensemble NetCDF file(s) written by `generate`.
    #[arg(short, long, required = true)]
    pub input: Vec<PathBuf>,

    /// Directory for the summary file.
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// First date to include. Defaults to the first time step present.
    #[arg(long)]
    pub start: Option<String>,

    /// Last date to include. Defaults to the last time step present.
    #[arg(long)]
    pub end: Option<String>,

    /// First ensemble member label to include.
    #[arg(long)]
    pub ensemble_start: Option<usize>,

    /// Last ensemble member label to include.
    #[arg(long)]
    pub ensemble_end: Option<usize>,
}
