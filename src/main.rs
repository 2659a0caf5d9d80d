//! Binary entry point for the `cdbfasta` command-line tool.
//!
//! Parses arguments, resolves them into a [`cdbfasta::build::BuildConfig`],
//! and runs one build. `BuildError` is threaded as a plain typed error
//! through the library; here at the process boundary it is wrapped in
//! `anyhow::Error` so the full cause chain can be printed to stderr.

use anyhow::Context;
use clap::Parser;

use cdbfasta::build;
use cdbfasta::cli::Cli;

fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve().context("invalid configuration")?;
    build::run(&config).context("index build failed")?;
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("cdbfasta: {err:?}");
        std::process::exit(1);
    }
}
