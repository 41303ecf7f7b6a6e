//! Shared cross-check pipeline used by all subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! config load -> dataset + plan -> comparator -> report
//!
//! The subcommand handlers can then focus on presentation (full table vs
//! ratio rows vs dataset summary).

use std::path::Path;

use crate::config::{self, LoadedAnalysis};
use crate::data::ResolvedDataset;
use crate::domain::{ComparisonReport, ComparisonSpec};
use crate::error::AppError;

/// All computed outputs of a single cross-check run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub dataset: ResolvedDataset,
    pub spec: ComparisonSpec,
    pub report: ComparisonReport,
}

/// Execute the full pipeline from a configuration file path.
pub fn run_checks(config_path: &Path) -> Result<RunOutput, AppError> {
    let loaded = config::load(config_path)?;
    run_checks_with(loaded)
}

/// Execute the pipeline with an already-loaded analysis.
///
/// This is useful for callers that build the dataset programmatically
/// (tests, notebooks) instead of going through YAML.
pub fn run_checks_with(loaded: LoadedAnalysis) -> Result<RunOutput, AppError> {
    let report =
        crate::engine::run_comparisons(&loaded.spec, &loaded.dataset).map_err(AppError::from)?;

    Ok(RunOutput {
        dataset: loaded.dataset,
        spec: loaded.spec,
        report,
    })
}
