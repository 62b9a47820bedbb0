//! Points of the mixed space R^r1 × C^r2.
//!
//! The lattice layer works on the flattened real vector
//! `[x_0, …, x_{r1-1}, Re z_0, Im z_0, …, Re z_{r2-1}, Im z_{r2-1}]`,
//! so every point converts to and from that layout.

use std::ops::{Add, Mul, Neg, Sub};

use num_complex::Complex64;

use crate::error::{GeometryError, Result};
use crate::signature::{Place, Signature};

/// A point of the mixed space attached to a signature.
#[derive(Clone, Debug, PartialEq)]
pub struct MixedPoint {
    /// One real coordinate per real place
    pub real: Vec<f64>,
    /// One complex coordinate per complex place
    pub complex: Vec<Complex64>,
}

impl MixedPoint {
    pub fn new(real: Vec<f64>, complex: Vec<Complex64>) -> Self {
        Self { real, complex }
    }

    pub fn zero(signature: &Signature) -> Self {
        Self {
            real: vec![0.0; signature.r1()],
            complex: vec![Complex64::new(0.0, 0.0); signature.r2()],
        }
    }

    /// Rebuilds a point from flattened real coordinates.
    ///
    /// # Arguments
    /// * `signature` - Signature fixing the layout
    /// * `coords` - Exactly `signature.degree()` reals
    pub fn from_coordinates(signature: &Signature, coords: &[f64]) -> Result<Self> {
        if coords.len() != signature.degree() {
            return Err(GeometryError::InvalidDimension {
                expected: signature.degree(),
                got: coords.len(),
            });
        }

        let r1 = signature.r1();
        let real = coords[..r1].to_vec();
        let complex = coords[r1..]
            .chunks_exact(2)
            .map(|pair| Complex64::new(pair[0], pair[1]))
            .collect();

        Ok(Self { real, complex })
    }

    pub fn to_coordinates(&self) -> Vec<f64> {
        let mut coords = Vec::with_capacity(self.dimension());
        coords.extend_from_slice(&self.real);
        for z in &self.complex {
            coords.push(z.re);
            coords.push(z.im);
        }
        coords
    }

    /// Real dimension r1 + 2·r2 of the ambient space.
    pub fn dimension(&self) -> usize {
        self.real.len() + 2 * self.complex.len()
    }

    pub fn signature(&self) -> Result<Signature> {
        Signature::new(self.real.len(), self.complex.len())
    }

    /// Coordinate of the point at a complex place, or the real coordinate
    /// viewed as a complex number at a real place.
    ///
    /// # Panics
    /// Panics if `place` is out of range for this point; validate it with
    /// `Signature::check_place` first.
    pub fn at_place(&self, place: Place) -> Complex64 {
        match place {
            Place::Real(i) => Complex64::new(self.real[i], 0.0),
            Place::Complex(j) => self.complex[j],
        }
    }

    /// |x_w|: absolute value at a real place, modulus at a complex place.
    ///
    /// # Panics
    /// Panics if `place` is out of range for this point.
    pub fn norm_at_place(&self, place: Place) -> f64 {
        match place {
            Place::Real(i) => self.real[i].abs(),
            Place::Complex(j) => self.complex[j].norm(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.real.iter().all(|&x| x == 0.0)
            && self.complex.iter().all(|z| z.re == 0.0 && z.im == 0.0)
    }

    /// Absolute norm Π_w |x_w|^mult(w).
    ///
    /// For the embedding of a field element this is |N(a)|.
    pub fn abs_norm(&self) -> f64 {
        let real: f64 = self.real.iter().map(|x| x.abs()).product();
        let complex: f64 = self.complex.iter().map(|z| z.norm_sqr()).product();
        real * complex
    }

    /// All n complex embeddings: real values, then each complex value
    /// followed by its conjugate.
    pub fn embeddings(&self) -> Vec<Complex64> {
        let mut values = Vec::with_capacity(self.dimension());
        values.extend(self.real.iter().map(|&x| Complex64::new(x, 0.0)));
        for z in &self.complex {
            values.push(*z);
            values.push(z.conj());
        }
        values
    }

    /// Largest per-place absolute value.
    pub fn sup_norm(&self) -> f64 {
        self.real
            .iter()
            .map(|x| x.abs())
            .chain(self.complex.iter().map(|z| z.norm()))
            .fold(0.0, f64::max)
    }

    /// Convex combination t·self + (1 - t)·other.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        self * t + &(other * (1.0 - t))
    }
}

impl Neg for MixedPoint {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            real: self.real.into_iter().map(|x| -x).collect(),
            complex: self.complex.into_iter().map(|z| -z).collect(),
        }
    }
}

impl Neg for &MixedPoint {
    type Output = MixedPoint;

    fn neg(self) -> MixedPoint {
        -self.clone()
    }
}

/// Coordinatewise sum.
///
/// # Panics
/// Panics if the two points have different signatures. Subtraction and
/// `lerp` inherit this.
impl Add<&MixedPoint> for MixedPoint {
    type Output = MixedPoint;

    fn add(self, other: &MixedPoint) -> MixedPoint {
        assert_eq!(
            (self.real.len(), self.complex.len()),
            (other.real.len(), other.complex.len()),
            "adding points of different signatures"
        );
        MixedPoint {
            real: self
                .real
                .iter()
                .zip(other.real.iter())
                .map(|(a, b)| a + b)
                .collect(),
            complex: self
                .complex
                .iter()
                .zip(other.complex.iter())
                .map(|(a, b)| a + b)
                .collect(),
        }
    }
}

impl Sub<&MixedPoint> for MixedPoint {
    type Output = MixedPoint;

    fn sub(self, other: &MixedPoint) -> MixedPoint {
        self + &(-other)
    }
}

impl Mul<f64> for &MixedPoint {
    type Output = MixedPoint;

    fn mul(self, scalar: f64) -> MixedPoint {
        MixedPoint {
            real: self.real.iter().map(|x| x * scalar).collect(),
            complex: self.complex.iter().map(|z| z * scalar).collect(),
        }
    }
}
