//! Ratio computations.
//!
//! Three layers, each feeding the next:
//!
//! - `ratio`: a generic ratio of two quantities
//! - `efficiency_corrected_ratio`: `(yield/eff)_num / (yield/eff)_den`
//! - `double_ratio`: a ratio of two already-computed ratios, built to cancel
//!   shared multiplicative systematics in the central value
//!
//! The double ratio cancels systematics in the physics interpretation only:
//! its uncertainty still combines both inputs in quadrature because all
//! quantities are treated as independent. That is a documented
//! approximation carried over from the source analysis, not an oversight.

use crate::domain::{Quantity, RatioResult};
use crate::error::EngineError;
use crate::math::divide;

/// Compute a generic ratio of two quantities.
///
/// The label is preserved verbatim into the result; this function never
/// synthesizes or rewrites labels.
pub fn ratio(
    numerator: Quantity,
    denominator: Quantity,
    label: impl Into<String>,
) -> Result<RatioResult, EngineError> {
    let quantity = divide(numerator, denominator)?;
    Ok(RatioResult {
        quantity,
        label: label.into(),
    })
}

/// Compute the efficiency-corrected yield ratio
/// `(yield_num / eff_num) / (yield_den / eff_den)`.
///
/// Fails with a division error when either efficiency, or the corrected
/// denominator, has value 0.
pub fn efficiency_corrected_ratio(
    yield_num: Quantity,
    eff_num: Quantity,
    yield_den: Quantity,
    eff_den: Quantity,
    label: impl Into<String>,
) -> Result<RatioResult, EngineError> {
    let corrected_num = divide(yield_num, eff_num)?;
    let corrected_den = divide(yield_den, eff_den)?;
    ratio(corrected_num, corrected_den, label)
}

/// Combine two ratios into a ratio-of-ratios.
pub fn double_ratio(
    numerator: &RatioResult,
    denominator: &RatioResult,
    label: impl Into<String>,
) -> Result<RatioResult, EngineError> {
    ratio(numerator.quantity, denominator.quantity, label)
}
