//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads and validates the YAML configuration
//! - runs the comparison plan
//! - prints the report
//! - writes optional exports

use clap::Parser;

use crate::cli::{CheckArgs, Command};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `rkx` binary.
pub fn run() -> Result<(), AppError> {
    // We want `rkx -c config.yaml` to behave like `rkx check -c config.yaml`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the habitual one-flag invocation.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Check(args) => handle_check(args, OutputMode::Full),
        Command::Ratios(args) => handle_check(args, OutputMode::RatiosOnly),
        Command::Validate(args) => handle_validate(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    RatiosOnly,
}

fn handle_check(args: CheckArgs, mode: OutputMode) -> Result<(), AppError> {
    let run = pipeline::run_checks(&args.config)?;

    println!(
        "{}",
        crate::report::format_report(&run.report, mode == OutputMode::Full)
    );

    if let Some(path) = &args.export {
        crate::io::write_report_json(path, &run.report, &args.config)?;
    }

    Ok(())
}

fn handle_validate(args: CheckArgs) -> Result<(), AppError> {
    let loaded = crate::config::load(&args.config)?;

    // Resolve everything the plan references; discard the results so a
    // passing validate means a check run cannot fail on this input.
    crate::engine::run_comparisons(&loaded.spec, &loaded.dataset).map_err(AppError::from)?;

    print!("{}", crate::report::format_dataset_summary(&loaded.dataset));
    println!(
        "Configuration OK: {} comparison group(s) resolved.",
        loaded.spec.groups.len()
    );
    Ok(())
}

/// Rewrite argv so `rkx <flags>` defaults to `rkx check <flags>`.
///
/// Rules:
/// - `rkx`                     -> `rkx check` (clap then reports the missing `-c`)
/// - `rkx -c cfg.yaml ...`     -> `rkx check -c cfg.yaml ...`
/// - `rkx --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("check".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "check" | "ratios" | "validate");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "check flags".
    if arg1.starts_with('-') {
        argv.insert(1, "check".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("rkx")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn bare_flags_default_to_the_check_subcommand() {
        let rewritten = rewrite_args(argv(&["-c", "cfg.yaml"]));
        assert_eq!(rewritten, argv(&["check", "-c", "cfg.yaml"]));
    }

    #[test]
    fn explicit_subcommands_and_help_pass_through() {
        let rewritten = rewrite_args(argv(&["validate", "-c", "cfg.yaml"]));
        assert_eq!(rewritten, argv(&["validate", "-c", "cfg.yaml"]));
        let rewritten = rewrite_args(argv(&["--help"]));
        assert_eq!(rewritten, argv(&["--help"]));
    }
}
