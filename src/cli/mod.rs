//! Command-line parsing for the cross-check tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the engine/arithmetic code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "rkx",
    version,
    about = "R(K) cross-checks from configured yields and efficiencies"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute all configured comparisons and print the full report.
    Check(CheckArgs),
    /// Print ratio rows only, without pull annotations (useful for scripting).
    Ratios(CheckArgs),
    /// Parse the configuration, resolve every referenced quantity, and print
    /// a dataset summary instead of the results table.
    Validate(CheckArgs),
}

/// Common options for all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct CheckArgs {
    /// Path to the YAML analysis configuration.
    #[arg(short = 'c', long, value_name = "YAML")]
    pub config: PathBuf,

    /// Export the full report (unrounded values, signed pulls) to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}
