//! Comparison plan orchestration.
//!
//! Walks a `ComparisonSpec` in declared order over a resolved dataset:
//!
//! - resolve each row's yields/efficiencies (and luminosities where asked)
//! - compute ratios and double ratios
//! - compute pulls against each row's declared reference
//!
//! Output order matches the declared order exactly; analysts read the table
//! top-to-bottom. Any failure aborts the whole run: a single missing or
//! malformed input makes the entire table suspect, so there is no partial
//! report.

use crate::data::ResolvedDataset;
use crate::domain::{
    ComparisonGroup, ComparisonReport, ComparisonSpec, GroupResult, ObservableRef, Quantity,
    RatioResult, ReferenceSpec, RowResult, RowSpec,
};
use crate::engine::{double_ratio, efficiency_corrected_ratio, pull};
use crate::error::EngineError;
use crate::math::{divide, multiply};

/// Compute every group of the declared plan, in order.
pub fn run_comparisons(
    spec: &ComparisonSpec,
    dataset: &ResolvedDataset,
) -> Result<ComparisonReport, EngineError> {
    let mut groups = Vec::with_capacity(spec.groups.len());
    for group in &spec.groups {
        groups.push(run_group(group, dataset)?);
    }
    Ok(ComparisonReport { groups })
}

fn run_group(
    group: &ComparisonGroup,
    dataset: &ResolvedDataset,
) -> Result<GroupResult, EngineError> {
    let mut rows: Vec<RowResult> = Vec::with_capacity(group.rows.len());
    for row in &group.rows {
        let result =
            compute_row(row, &rows, dataset).map_err(|e| e.in_row(row.label()))?;
        rows.push(result);
    }
    Ok(GroupResult {
        title: group.title.clone(),
        rows,
    })
}

fn compute_row(
    row: &RowSpec,
    earlier: &[RowResult],
    dataset: &ResolvedDataset,
) -> Result<RowResult, EngineError> {
    let (ratio, reference) = match row {
        RowSpec::Ratio {
            label,
            numerator,
            denominator,
            lumi_normalized,
            reference,
        } => {
            let (y_num, eff_num) = resolve_side(numerator, *lumi_normalized, dataset)?;
            let (y_den, eff_den) = resolve_side(denominator, *lumi_normalized, dataset)?;
            let ratio =
                efficiency_corrected_ratio(y_num, eff_num, y_den, eff_den, label.clone())?;
            (ratio, reference)
        }
        RowSpec::DoubleRatio {
            label,
            numerator,
            denominator,
            reference,
        } => {
            let num = declared_ratio(earlier, numerator)?;
            let den = declared_ratio(earlier, denominator)?;
            (double_ratio(num, den, label.clone())?, reference)
        }
    };

    let pull_result = match reference {
        Some(spec) => Some(pull(ratio.quantity, resolve_reference(spec, dataset)?)?),
        None => None,
    };

    Ok(RowResult {
        ratio,
        pull: pull_result,
    })
}

/// Resolve one side of a ratio to its (possibly luminosity-normalized)
/// yield and its efficiency.
fn resolve_side(
    side: &ObservableRef,
    lumi_normalized: bool,
    dataset: &ResolvedDataset,
) -> Result<(Quantity, Quantity), EngineError> {
    let mut yield_q = dataset.yield_for(&side.observable, &side.key)?;
    if lumi_normalized {
        yield_q = divide(yield_q, dataset.luminosity_for(&side.key)?)?;
    }
    let eff = dataset.efficiency_for(&side.observable, &side.key)?;
    Ok((yield_q, eff))
}

/// Find a previously computed ratio row by its label.
fn declared_ratio<'a>(
    earlier: &'a [RowResult],
    label: &str,
) -> Result<&'a RatioResult, EngineError> {
    earlier
        .iter()
        .map(|r| &r.ratio)
        .find(|r| r.label == label)
        .ok_or_else(|| EngineError::UndeclaredRow {
            reference: label.to_string(),
        })
}

/// Evaluate a reference declaration to a quantity, with the same quadrature
/// arithmetic as the measured side.
fn resolve_reference(
    spec: &ReferenceSpec,
    dataset: &ResolvedDataset,
) -> Result<Quantity, EngineError> {
    match spec {
        ReferenceSpec::Unity => Ok(Quantity::exact(1.0)),
        ReferenceSpec::Constant(name) => dataset.reference_for(name),
        ReferenceSpec::ConstantRatio {
            numerator,
            denominator,
        } => {
            let num = constant_product(numerator, dataset)?;
            let den = constant_product(denominator, dataset)?;
            divide(num, den)
        }
    }
}

fn constant_product(
    names: &[String],
    dataset: &ResolvedDataset,
) -> Result<Quantity, EngineError> {
    let mut product = Quantity::exact(1.0);
    for name in names {
        product = multiply(product, dataset.reference_for(name)?)?;
    }
    Ok(product)
}
