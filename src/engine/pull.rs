//! Pull (tension) computation.
//!
//! The pull quantifies how far a measured quantity sits from a reference,
//! in units of their combined standard deviation:
//!
//! ```text
//! σ_c  = sqrt(σ_measured² + σ_reference²)
//! pull = (measured - reference) / σ_c
//! ```
//!
//! The sign convention is measured minus reference. The engine always
//! returns the signed value and performs no rounding; presentation is the
//! report layer's concern.

use crate::domain::{PullResult, Quantity};
use crate::error::EngineError;
use crate::math::values_equal;

/// Compute the signed pull of `measured` against `reference`.
///
/// When both inputs are exact (uncertainty 0), the pull is defined as 0 if
/// their values agree (within the documented `VALUE_EPS`), and undefined
/// otherwise. The equal case is decided before any division; it is a
/// business rule, not an inference from a 0/0 result.
pub fn pull(measured: Quantity, reference: Quantity) -> Result<PullResult, EngineError> {
    let combined = (measured.uncertainty * measured.uncertainty
        + reference.uncertainty * reference.uncertainty)
        .sqrt();

    // Uncertainties are non-negative, so `combined == 0` exactly when both
    // inputs are exact constants.
    if combined == 0.0 {
        if values_equal(measured.value, reference.value) {
            return Ok(PullResult {
                deviation_sigma: 0.0,
                measured,
                reference,
            });
        }
        return Err(EngineError::UndefinedPull {
            measured: measured.value,
            reference: reference.value,
        });
    }

    Ok(PullResult {
        deviation_sigma: (measured.value - reference.value) / combined,
        measured,
        reference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_ratio_pull_from_unity_is_about_0p7_sigma() {
        let measured = Quantity::new(1.0312, 0.0450);
        let p = pull(measured, Quantity::exact(1.0)).unwrap();
        assert!(
            (p.deviation_sigma - 0.693).abs() < 5e-3,
            "pull {:.4} should be near 0.693",
            p.deviation_sigma
        );
    }

    #[test]
    fn pull_is_antisymmetric_under_swapping() {
        let a = Quantity::new(1.0312, 0.0450);
        let b = Quantity::new(0.98, 0.02);
        let forward = pull(a, b).unwrap();
        let backward = pull(b, a).unwrap();
        assert!((forward.deviation_sigma + backward.deviation_sigma).abs() < 1e-12);
    }

    #[test]
    fn exact_and_equal_inputs_pull_zero() {
        let p = pull(Quantity::exact(1.0), Quantity::exact(1.0)).unwrap();
        assert_eq!(p.deviation_sigma, 0.0);
    }

    #[test]
    fn exact_and_unequal_inputs_are_undefined() {
        let err = pull(Quantity::exact(1.0), Quantity::exact(1.1)).unwrap_err();
        assert!(matches!(err, EngineError::UndefinedPull { .. }));
    }

    #[test]
    fn result_carries_both_inputs_for_audit() {
        let measured = Quantity::new(0.9, 0.1);
        let reference = Quantity::new(1.0, 0.05);
        let p = pull(measured, reference).unwrap();
        assert!((p.measured.value - 0.9).abs() < 1e-12);
        assert!((p.reference.uncertainty - 0.05).abs() < 1e-12);
        assert!(p.deviation_sigma < 0.0, "below-reference pull is negative");
    }
}
