//! Signatures and infinite places of a number field.
//!
//! A field of degree n = r1 + 2·r2 has r1 real places and r2 complex places.
//! Every formula in this crate folds over places using the local degree
//! `mult(w)`, which is 1 for a real place and 2 for a complex one.

use std::fmt;

use crate::error::{GeometryError, Result};

/// An infinite place of the field, tagged by kind and indexed within its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Place {
    Real(usize),
    Complex(usize),
}

impl Place {
    /// Local degree of the place: 1 for real, 2 for complex.
    pub fn mult(&self) -> u32 {
        match self {
            Place::Real(_) => 1,
            Place::Complex(_) => 2,
        }
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Place::Real(_))
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Place::Complex(_))
    }

    pub fn index(&self) -> usize {
        match self {
            Place::Real(i) | Place::Complex(i) => *i,
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Real(i) => write!(f, "real place {}", i),
            Place::Complex(i) => write!(f, "complex place {}", i),
        }
    }
}

/// Signature (r1, r2) of a number field.
///
/// # Mathematical Properties
/// - The mixed space R^r1 × C^r2 has real dimension `degree() = r1 + 2·r2`
/// - There are `num_places() = r1 + r2` infinite places
/// - Places are ordered real-first, then complex, each by index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    r1: usize,
    r2: usize,
}

impl Signature {
    /// Creates a signature, rejecting the empty one (degree 0).
    pub fn new(r1: usize, r2: usize) -> Result<Self> {
        if r1 + r2 == 0 {
            return Err(GeometryError::InvalidParameters(
                "Signature must have at least one place".to_string(),
            ));
        }
        Ok(Self { r1, r2 })
    }

    pub fn r1(&self) -> usize {
        self.r1
    }

    pub fn r2(&self) -> usize {
        self.r2
    }

    /// Field degree n = r1 + 2·r2, the real dimension of the mixed space.
    pub fn degree(&self) -> usize {
        self.r1 + 2 * self.r2
    }

    pub fn num_places(&self) -> usize {
        self.r1 + self.r2
    }

    pub fn places(&self) -> impl Iterator<Item = Place> {
        (0..self.r1)
            .map(Place::Real)
            .chain((0..self.r2).map(Place::Complex))
    }

    pub fn contains(&self, place: Place) -> bool {
        match place {
            Place::Real(i) => i < self.r1,
            Place::Complex(i) => i < self.r2,
        }
    }

    /// Returns `InvalidPlace` unless `place` belongs to this signature.
    pub fn check_place(&self, place: Place) -> Result<()> {
        if self.contains(place) {
            Ok(())
        } else {
            Err(GeometryError::InvalidPlace {
                place,
                r1: self.r1,
                r2: self.r2,
            })
        }
    }

    /// Offset of the first flattened coordinate belonging to `place`.
    ///
    /// Real place i owns coordinate i; complex place j owns the pair
    /// (r1 + 2j, r1 + 2j + 1) holding real and imaginary parts.
    pub fn coordinate_offset(&self, place: Place) -> usize {
        match place {
            Place::Real(i) => i,
            Place::Complex(j) => self.r1 + 2 * j,
        }
    }
}
