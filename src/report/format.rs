//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engine stays free of string concerns (and of rounding)
//! - output changes are localized (important for future snapshot tests)
//!
//! Layout follows the analysis' cross-check note: a banner, one section per
//! comparison group, and `label : value (pull)` rows with fixed column
//! widths so the table scans vertically.

use crate::data::ResolvedDataset;
use crate::domain::{ComparisonReport, PullResult, Quantity, RowResult};
use crate::math::values_equal;

const LABEL_WIDTH: usize = 38;
const VALUE_WIDTH: usize = 25;
const BANNER_WIDTH: usize = 80;

/// Render the full results table.
///
/// `show_pulls = false` suppresses the pull annotations (the `ratios`
/// subcommand), leaving only labels and values.
pub fn format_report(report: &ComparisonReport, show_pulls: bool) -> String {
    let mut out = String::new();

    out.push_str(&"=".repeat(BANNER_WIDTH));
    out.push('\n');
    out.push_str("CROSS-CHECK RESULTS\n");
    out.push_str(&"=".repeat(BANNER_WIDTH));
    out.push('\n');

    for group in &report.groups {
        out.push('\n');
        out.push_str(&format!("--- {} ---\n", group.title));
        for row in &group.rows {
            out.push_str(&format_row(row, show_pulls));
            out.push('\n');
        }
    }

    out.push_str(&"=".repeat(BANNER_WIDTH));
    out.push('\n');
    out
}

fn format_row(row: &RowResult, show_pulls: bool) -> String {
    let value = fmt_quantity(row.ratio.quantity);
    let mut line = format!(
        "{:<LABEL_WIDTH$} : {:<VALUE_WIDTH$}",
        row.ratio.label, value
    );

    if show_pulls {
        if let Some(pull) = &row.pull {
            line.push_str(&format!("({})", fmt_pull(pull)));
        }
    }

    line.trim_end().to_string()
}

/// Pull annotation text. The signed engine value is presented as an
/// absolute deviation rounded to one decimal, as in the original tables.
fn fmt_pull(pull: &PullResult) -> String {
    if is_unity_reference(pull.reference) {
        format!("Pull from 1.0: {:.1}σ", pull.deviation_sigma.abs())
    } else {
        format!(
            "PDG: {}, Pull: {:.1}σ",
            fmt_quantity(pull.reference),
            pull.deviation_sigma.abs()
        )
    }
}

/// Whether a reference is the exact constant 1.0.
///
/// Uses the engine's documented `VALUE_EPS` tolerance; this only selects
/// the "Pull from 1.0" wording, never the arithmetic.
fn is_unity_reference(q: Quantity) -> bool {
    q.is_exact() && values_equal(q.value, 1.0)
}

/// Render a quantity as `value ± uncertainty`.
///
/// Ratios and branching fractions get four decimals; large counts (raw
/// yields in dataset summaries) are shown as integers.
pub fn fmt_quantity(q: Quantity) -> String {
    if q.value.abs() >= 1000.0 {
        format!("{:.0} ± {:.0}", q.value, q.uncertainty)
    } else {
        format!("{:.4} ± {:.4}", q.value, q.uncertainty)
    }
}

/// Render the dataset summary for `rkx validate`.
pub fn format_dataset_summary(dataset: &ResolvedDataset) -> String {
    let summary = dataset.summary();
    let mut out = String::new();

    out.push_str(&format!(
        "Dataset: {} channel/era key(s) | {} yield(s) | {} efficiency(ies) | {} luminosity(ies) | {} reference(s)\n",
        summary.n_keys,
        summary.n_yields,
        summary.n_efficiencies,
        summary.n_luminosities,
        summary.n_references
    ));

    for (observable, key, q) in dataset.yield_entries() {
        out.push_str(&format!(
            "  yield      {observable:<10} @ {key:<10} : {}\n",
            fmt_quantity(q)
        ));
    }
    for (observable, key, q) in dataset.efficiency_entries() {
        out.push_str(&format!(
            "  efficiency {observable:<10} @ {key:<10} : {}\n",
            fmt_quantity(q)
        ));
    }
    for (key, q) in dataset.luminosity_entries() {
        out.push_str(&format!(
            "  luminosity {:<10} @ {key:<10} : {}\n",
            "",
            fmt_quantity(q)
        ));
    }
    for (name, q) in dataset.reference_entries() {
        out.push_str(&format!("  reference  {name:<24} : {}\n", fmt_quantity(q)));
    }

    out
}
