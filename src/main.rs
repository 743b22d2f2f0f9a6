mod cli;
mod climatology_cmd;
mod config;
mod convert;
mod fit_cmd;
mod generate;
mod logging;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Generate(args) => generate::run(args),
        Command::Fit(args) => fit_cmd::run(args),
        Command::Climatology(args) => climatology_cmd::run(args),
    }
}
