//! Uncertainty propagation for products and ratios.
//!
//! Every quantity carries a symmetric one-standard-deviation uncertainty,
//! and all operands are treated as statistically independent. Under that
//! assumption, products and ratios propagate by the relative-quadrature
//! rule:
//!
//! ```text
//! σ_r / |r| = sqrt( (σ_a / a)² + (σ_b / b)² )
//! ```
//!
//! Quadrature (sum of squares) is the sole combination law used anywhere in
//! the engine; no covariance terms are modeled. A consequence worth knowing:
//! dividing a quantity by itself does **not** cancel its uncertainty.
//! `divide(a, a)` has value 1.0 but a strictly positive uncertainty whenever
//! `a` is not exact. That is the intended independent-error accounting, not
//! a bug.
//!
//! Numerical notes:
//! - A zero-valued operand has no defined relative uncertainty unless it is
//!   an exact zero constant (uncertainty also 0), which contributes nothing.
//!   The zero tests are exact-zero domain checks, not tolerance comparisons.
//! - Result uncertainties are formed as `|value| * sqrt(..)`, so they can
//!   never come out negative.

use crate::domain::Quantity;
use crate::error::EngineError;

/// Tolerance for value-equality decisions.
///
/// Quantities are never compared with bare floating equality. The few places
/// that need "are these values the same?" (the equal-and-exact pull
/// convention, detecting a reference of exactly 1.0 in the report layer) use
/// this relative epsilon with an absolute floor of the same magnitude.
pub const VALUE_EPS: f64 = 1e-12;

/// Whether two values are equal within [`VALUE_EPS`].
pub fn values_equal(a: f64, b: f64) -> bool {
    let scale = 1.0_f64.max(a.abs()).max(b.abs());
    (a - b).abs() <= VALUE_EPS * scale
}

/// The relative uncertainty `σ / |value|` of a quantity.
///
/// An exact zero constant contributes 0. A zero-valued quantity with
/// nonzero uncertainty has no defined relative uncertainty and fails.
fn relative_uncertainty(q: Quantity) -> Result<f64, EngineError> {
    if q.value == 0.0 {
        if q.uncertainty == 0.0 {
            return Ok(0.0);
        }
        return Err(EngineError::UndefinedRelativeUncertainty {
            uncertainty: q.uncertainty,
        });
    }
    Ok(q.uncertainty / q.value.abs())
}

/// Multiply two independent quantities.
pub fn multiply(a: Quantity, b: Quantity) -> Result<Quantity, EngineError> {
    let ra = relative_uncertainty(a)?;
    let rb = relative_uncertainty(b)?;
    let value = a.value * b.value;
    let uncertainty = value.abs() * (ra * ra + rb * rb).sqrt();
    Ok(Quantity::new(value, uncertainty))
}

/// Divide two independent quantities.
///
/// Fails when the denominator's value is exactly 0.
pub fn divide(a: Quantity, b: Quantity) -> Result<Quantity, EngineError> {
    if b.value == 0.0 {
        return Err(EngineError::DivisionByZero);
    }
    let ra = relative_uncertainty(a)?;
    let rb = relative_uncertainty(b)?;
    let value = a.value / b.value;
    let uncertainty = value.abs() * (ra * ra + rb * rb).sqrt();
    Ok(Quantity::new(value, uncertainty))
}
