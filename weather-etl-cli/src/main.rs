//! Binary crate for the `weather-etl` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and layering them over the stored config
//! - Interactive configuration
//! - Per-run logging to the console and a log file
//! - Human-friendly output and the process exit status

use clap::Parser;
use std::process::ExitCode;

mod cli;
mod logger;
mod output;

// Locations are processed one at a time; a single-threaded runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}
