//! Solving for one place bound so that the weighted product hits a target.

use tracing::warn;

use crate::bounds::PlaceBoundVector;
use crate::error::{GeometryError, Result};
use crate::signature::Place;

/// Results whose natural log exceeds this are reported instead of returned,
/// since they sit within a few orders of magnitude of `f64::MAX`.
const LN_OVERFLOW_WARNING: f64 = 700.0;

/// Returns `g` with `g(w) = f(w)` for `w ≠ w1` and `Π_w g(w)^mult(w) = target`.
///
/// # Arguments
/// * `bounds` - The bounds f; every place other than `w1` must be nonzero
/// * `w1` - The place whose bound is solved for
/// * `target` - Desired weighted product, a finite non-negative real
///
/// # Mathematical Implementation
/// g(w1) = (target / Π_{w≠w1} f(w)^mult(w))^(1/mult(w1)), evaluated as
/// exp((ln target - Σ_{w≠w1} mult(w)·ln f(w)) / mult(w1)) so that very large
/// or very small fixed products do not overflow before the root is taken.
///
/// # Errors
/// * `InvalidPlace` - `w1` is not a place of the signature
/// * `InvalidDomain` - `target` is negative or not finite, or the solution
///   is not representable as a finite `f64`
/// * `DivisionByZero` - Some fixed bound is zero
pub fn adjust_bound(bounds: &PlaceBoundVector, w1: Place, target: f64) -> Result<PlaceBoundVector> {
    let signature = bounds.signature();
    signature.check_place(w1)?;
    if !target.is_finite() || target < 0.0 {
        return Err(GeometryError::InvalidDomain(format!(
            "target product must be a finite non-negative real, got {}",
            target
        )));
    }

    let mut ln_fixed = 0.0;
    for (w, value) in bounds.iter() {
        if w == w1 {
            continue;
        }
        if value == 0.0 {
            return Err(GeometryError::DivisionByZero { place: w });
        }
        ln_fixed += w.mult() as f64 * value.ln();
    }

    let solved = if target == 0.0 {
        0.0
    } else {
        let ln_solved = (target.ln() - ln_fixed) / w1.mult() as f64;
        if ln_solved > LN_OVERFLOW_WARNING {
            warn!(place = %w1, ln_solved, "adjusted bound is close to overflow");
        }
        ln_solved.exp()
    };
    if !solved.is_finite() {
        return Err(GeometryError::InvalidDomain(format!(
            "adjusted bound at {} overflows (target {})",
            w1, target
        )));
    }

    let mut adjusted = bounds.clone();
    adjusted.set(w1, solved)?;
    Ok(adjusted)
}
