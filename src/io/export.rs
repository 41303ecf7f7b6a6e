//! Write report JSON files.
//!
//! Report JSON is the "portable" representation of a cross-check run:
//! unrounded values, signed pulls, and both pull inputs per row, plus run
//! metadata (tool, generation time, config path). Downstream notebooks and
//! plots consume this instead of scraping the terminal table.

use std::fs::File;
use std::path::Path;

use chrono::Local;
use serde::Serialize;

use crate::domain::ComparisonReport;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ReportFile<'a> {
    tool: &'static str,
    generated: String,
    config: String,
    report: &'a ComparisonReport,
}

/// Write a report JSON file.
pub fn write_report_json(
    path: &Path,
    report: &ComparisonReport,
    config_path: &Path,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create report JSON '{}': {e}", path.display()),
        )
    })?;

    let doc = ReportFile {
        tool: "rkx",
        generated: Local::now().to_rfc3339(),
        config: config_path.display().to_string(),
        report,
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;

    Ok(())
}
