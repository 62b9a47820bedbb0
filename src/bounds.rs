//! Per-place bound vectors.

use crate::error::{GeometryError, Result};
use crate::signature::{Place, Signature};

/// An assignment of a finite non-negative bound to every place of a signature.
///
/// Bounds are validated on every write so that the volume functions built
/// on top of this type are total.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaceBoundVector {
    signature: Signature,
    real: Vec<f64>,
    complex: Vec<f64>,
}

impl PlaceBoundVector {
    /// Creates a bound vector from per-kind bound lists.
    ///
    /// # Arguments
    /// * `signature` - Signature of the field
    /// * `real` - One bound per real place
    /// * `complex` - One bound per complex place
    ///
    /// # Returns
    /// * `Result<Self>` - Validated bounds, or `InvalidDimension` / `InvalidDomain`
    pub fn new(signature: Signature, real: Vec<f64>, complex: Vec<f64>) -> Result<Self> {
        if real.len() != signature.r1() {
            return Err(GeometryError::InvalidDimension {
                expected: signature.r1(),
                got: real.len(),
            });
        }
        if complex.len() != signature.r2() {
            return Err(GeometryError::InvalidDimension {
                expected: signature.r2(),
                got: complex.len(),
            });
        }
        for &value in real.iter().chain(complex.iter()) {
            check_bound(value)?;
        }
        Ok(Self {
            signature,
            real,
            complex,
        })
    }

    /// The same bound `value` at every place.
    pub fn constant(signature: Signature, value: f64) -> Result<Self> {
        Self::new(
            signature,
            vec![value; signature.r1()],
            vec![value; signature.r2()],
        )
    }

    /// Builds bounds place by place from a function of the place.
    pub fn from_fn<F: FnMut(Place) -> f64>(signature: Signature, mut f: F) -> Result<Self> {
        let real = (0..signature.r1()).map(|i| f(Place::Real(i))).collect();
        let complex = (0..signature.r2()).map(|j| f(Place::Complex(j))).collect();
        Self::new(signature, real, complex)
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    pub fn get(&self, place: Place) -> Result<f64> {
        self.signature.check_place(place)?;
        Ok(self.at(place))
    }

    pub fn set(&mut self, place: Place, value: f64) -> Result<()> {
        self.signature.check_place(place)?;
        check_bound(value)?;
        match place {
            Place::Real(i) => self.real[i] = value,
            Place::Complex(j) => self.complex[j] = value,
        }
        Ok(())
    }

    /// Unchecked lookup for places already known to belong to the signature.
    pub(crate) fn at(&self, place: Place) -> f64 {
        match place {
            Place::Real(i) => self.real[i],
            Place::Complex(j) => self.complex[j],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Place, f64)> + '_ {
        self.signature.places().map(move |w| (w, self.at(w)))
    }

    /// Π_w f(w)^mult(w).
    pub fn weighted_product(&self) -> f64 {
        self.iter()
            .map(|(w, value)| value.powi(w.mult() as i32))
            .product()
    }

    /// Σ_w mult(w)·ln f(w); `-∞` as soon as one bound is zero.
    pub fn ln_weighted_product(&self) -> f64 {
        self.iter()
            .map(|(w, value)| w.mult() as f64 * value.ln())
            .sum()
    }

    /// True iff some place carries the bound 0.
    pub fn has_zero(&self) -> bool {
        self.iter().any(|(_, value)| value == 0.0)
    }

    /// Pointwise comparison `self(w) <= other(w)` for every place.
    pub fn is_dominated_by(&self, other: &Self) -> bool {
        self.signature == other.signature
            && self
                .iter()
                .zip(other.iter())
                .all(|((_, a), (_, b))| a <= b)
    }
}

fn check_bound(value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(GeometryError::InvalidDomain(format!(
            "bound must be a finite non-negative real, got {}",
            value
        )));
    }
    Ok(())
}
