//! Closed-form volumes of the convex bodies of the mixed space.
//!
//! Mathematical Foundation:
//! Lebesgue measure on R^r1 × C^r2 is the product of the standard measures on
//! each real line and each complex plane. The three region families factor
//! over places, so each volume is a constant depending only on the signature
//! times a product of per-place bounds:
//!
//! - ConvexBodyLT(f):      2^r1 · π^r2 · Π_w f(w)^mult(w)
//! - ConvexBodyLT'(f, w0): 2^(r1+2) · π^(r2-1) · Π_w f(w)^mult(w)
//! - ConvexBodySum(B):     2^r1 · (π/2)^r2 / n! · B^n
//!
//! The sum body is the sub-level set {g ≤ B} of the gauge
//! g(x) = Σ_w mult(w)·|x_w|. Writing ∫ exp(-g) = ∫_0^∞ vol{g ≤ t} e^{-t} dt
//! and using homogeneity gives vol{g ≤ B} = B^n / n! · ∫ exp(-g). The
//! integral factors over places: ∫_R e^{-|x|} dx = 2·Γ(1) = 2 and
//! ∫_C e^{-2|z|} dz = 2π·Γ(2)/4 = π/2.
//!
//! The signature-dependent constants are kept exact as a rational multiple of
//! a power of π. When the constant or the bound product leaves the range of
//! `f64` on its own, the volume is assembled from their logarithms instead,
//! so a representable volume is always produced as one.

use std::f64::consts::{LN_2, PI};
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive};

use crate::bounds::PlaceBoundVector;
use crate::error::{GeometryError, Result};
use crate::signature::Signature;

/// An exact volume constant `rational · π^pi_power`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VolumeFactor {
    rational: BigRational,
    pi_power: u32,
}

impl VolumeFactor {
    pub fn new(rational: BigRational, pi_power: u32) -> Self {
        Self { rational, pi_power }
    }

    pub fn rational(&self) -> &BigRational {
        &self.rational
    }

    pub fn pi_power(&self) -> u32 {
        self.pi_power
    }

    /// Floating-point value of the constant.
    ///
    /// The rational part is rounded once; π^k is evaluated by repeated
    /// multiplication.
    pub fn to_f64(&self) -> f64 {
        let rational = self.rational.to_f64().unwrap_or(f64::INFINITY);
        rational * PI.powi(self.pi_power as i32)
    }

    /// Natural logarithm of the constant, finite even when the constant
    /// itself is outside the range of `f64`.
    pub fn ln(&self) -> f64 {
        ln_big(self.rational.numer()) - ln_big(self.rational.denom())
            + self.pi_power as f64 * PI.ln()
    }

    /// The constant times a bound product, given both directly and as a
    /// logarithm.
    ///
    /// The plain product is used whenever the constant, the product and the
    /// result are all normal floats; otherwise the two logarithms are added,
    /// so `0·∞` never arises from an over- or underflowing intermediate.
    /// `ln_product = -∞` (a zero bound somewhere) gives exactly 0.
    pub fn scale(&self, product: f64, ln_product: f64) -> f64 {
        if ln_product == f64::NEG_INFINITY {
            return 0.0;
        }
        let factor = self.to_f64();
        let direct = factor * product;
        if factor.is_normal() && product.is_normal() && direct.is_normal() {
            return direct;
        }
        (self.ln() + ln_product).exp()
    }
}

/// ln |x| for an arbitrarily large integer.
fn ln_big(x: &BigInt) -> f64 {
    let bits = x.bits();
    if bits <= F64_SAFE_BITS {
        return x.to_f64().map_or(f64::NAN, |v| v.abs().ln());
    }
    // keep the leading 64 bits and account for the rest as a power of two
    let shift = bits - 64;
    let head = (x >> shift).to_f64().map_or(f64::NAN, f64::abs);
    head.ln() + shift as f64 * LN_2
}

/// Integers up to this many bits convert to a finite `f64`.
const F64_SAFE_BITS: u64 = 1000;

impl fmt::Display for VolumeFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pi_power {
            0 => write!(f, "{}", self.rational),
            1 => write!(f, "{}·π", self.rational),
            k => write!(f, "{}·π^{}", self.rational, k),
        }
    }
}

fn pow2(exponent: usize) -> BigInt {
    BigInt::one() << exponent
}

fn factorial(n: usize) -> BigInt {
    (1..=n).fold(BigInt::one(), |acc, k| acc * BigInt::from(k))
}

/// Constant C_LT = 2^r1 · π^r2 of the box body.
pub fn convex_body_lt_factor(signature: &Signature) -> VolumeFactor {
    VolumeFactor::new(
        BigRational::from_integer(pow2(signature.r1())),
        signature.r2() as u32,
    )
}

/// Constant C_LT' = 2^(r1+2) · π^(r2-1) of the box body with one rectangle.
///
/// The disk of area π·f(w0)^2 at w0 is replaced by the rectangle
/// |Re| < 1, |Im| < f(w0)^2 of area 4·f(w0)^2, so the ratio 4/π moves into
/// the constant. Requires at least one complex place.
pub fn convex_body_lt_prime_factor(signature: &Signature) -> Result<VolumeFactor> {
    if signature.r2() == 0 {
        return Err(GeometryError::InvalidParameters(
            "ConvexBodyLT' requires at least one complex place".to_string(),
        ));
    }
    Ok(VolumeFactor::new(
        BigRational::from_integer(pow2(signature.r1() + 2)),
        (signature.r2() - 1) as u32,
    ))
}

/// Constant C_sum = 2^r1 · (π/2)^r2 / n! of the weighted cross-polytope.
pub fn convex_body_sum_factor(signature: &Signature) -> VolumeFactor {
    let numerator = pow2(signature.r1());
    let denominator = pow2(signature.r2()) * factorial(signature.degree());
    VolumeFactor::new(
        BigRational::new(numerator, denominator),
        signature.r2() as u32,
    )
}

/// Volume of ConvexBodyLT(f).
///
/// # Mathematical Properties
/// - Zero as soon as one bound is zero
/// - Monotone non-decreasing in every bound
pub fn convex_body_lt_volume(bounds: &PlaceBoundVector) -> f64 {
    convex_body_lt_factor(&bounds.signature())
        .scale(bounds.weighted_product(), bounds.ln_weighted_product())
}

/// Volume of ConvexBodyLT'(f, w0); independent of which complex place w0 is.
pub fn convex_body_lt_prime_volume(bounds: &PlaceBoundVector) -> Result<f64> {
    let factor = convex_body_lt_prime_factor(&bounds.signature())?;
    Ok(factor.scale(bounds.weighted_product(), bounds.ln_weighted_product()))
}

/// Volume of ConvexBodySum(B); zero for B <= 0.
pub fn convex_body_sum_volume(signature: &Signature, bound: f64) -> f64 {
    if bound <= 0.0 {
        return 0.0;
    }
    let n = signature.degree();
    convex_body_sum_factor(signature).scale(bound.powi(n as i32), n as f64 * bound.ln())
}
