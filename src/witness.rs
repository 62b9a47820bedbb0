//! Typed consequences of the convex body theorem for ideals of a number field.
//!
//! The field, its ideals and the embedding live outside this crate; they are
//! reached through [`IdealLattice`]. Each function here builds the region,
//! runs the Minkowski search over the ideal lattice and lifts the point back
//! to a field element.

use tracing::error;

use crate::bounds::PlaceBoundVector;
use crate::config::SearchConfig;
use crate::error::{GeometryError, Result};
use crate::lattice::{Lattice, LatticeBasis};
use crate::mixed_space::MixedPoint;
use crate::region::{ConvexBody, ConvexBodyLt, ConvexBodyLtPrime, ConvexBodySum};
use crate::search::{LatticePointSearch, LatticePointWitness, SearchStats};
use crate::signature::{Place, Signature};

/// The image of an ideal of a number field in its mixed space.
pub trait IdealLattice {
    /// Field elements as represented by the caller
    type Element;

    fn signature(&self) -> Signature;

    fn degree(&self) -> usize {
        self.signature().degree()
    }

    /// Images of a Z-basis of the ideal.
    fn basis(&self) -> LatticeBasis;

    /// Covolume of the ideal lattice.
    fn covolume(&self) -> f64;

    fn embed(&self, element: &Self::Element) -> MixedPoint;

    /// Partial inverse of `embed`, defined on points of the ideal lattice.
    fn lift(&self, point: &MixedPoint) -> Option<Self::Element>;
}

/// A nonzero element of an ideal together with its embedding.
#[derive(Clone, Debug, PartialEq)]
pub struct IdealWitness<E> {
    pub element: E,
    pub point: MixedPoint,
    pub stats: SearchStats,
}

impl<E> IdealWitness<E> {
    /// |N(a)| computed from the embedding.
    pub fn abs_norm(&self) -> f64 {
        self.point.abs_norm()
    }
}

/// A nonzero element with |N(a)| bounded through the AM–GM inequality.
#[derive(Clone, Debug, PartialEq)]
pub struct NormBoundedWitness<E> {
    pub witness: IdealWitness<E>,
    /// Guaranteed bound (B/n)^n on |N(a)|
    pub norm_bound: f64,
}

/// A primitive element of the field with every embedding bounded.
#[derive(Clone, Debug, PartialEq)]
pub struct PrimitiveWitness<E> {
    pub witness: IdealWitness<E>,
    /// Strict bound on |a|_w at every place
    pub embedding_bound: f64,
}

fn lattice_of<I: IdealLattice + ?Sized>(ideal: &I) -> Result<Lattice> {
    Lattice::new(ideal.basis(), ideal.covolume())
}

fn lift_witness<I: IdealLattice + ?Sized>(
    ideal: &I,
    found: LatticePointWitness,
) -> Result<IdealWitness<I::Element>> {
    let element = ideal.lift(&found.point).ok_or_else(|| {
        GeometryError::LiftFailed(format!(
            "point with coefficients {:?} is not in the ideal lattice",
            found.coefficients
        ))
    })?;
    Ok(IdealWitness {
        element,
        point: found.point,
        stats: found.stats,
    })
}

/// Finds a nonzero element of the ideal in a convex body.
fn search_body<I, R>(ideal: &I, region: &R, config: &SearchConfig) -> Result<IdealWitness<I::Element>>
where
    I: IdealLattice + ?Sized,
    R: ConvexBody,
{
    let lattice = lattice_of(ideal)?;
    let found = LatticePointSearch::new(config.clone())?.find_in_region(&lattice, region)?;
    lift_witness(ideal, found)
}

/// Nonzero `a` in the ideal with `|a|_w < f(w)` at every place.
///
/// Requires `minkowski_bound < vol(ConvexBodyLT(f))`.
pub fn exists_ne_zero_mem_ideal_lt<I>(
    ideal: &I,
    bounds: &PlaceBoundVector,
    config: &SearchConfig,
) -> Result<IdealWitness<I::Element>>
where
    I: IdealLattice + ?Sized,
{
    search_body(ideal, &ConvexBodyLt::new(bounds.clone()), config)
}

/// Nonzero `a` in the ideal inside ConvexBodyLT'(f, w0).
pub fn exists_ne_zero_mem_ideal_lt_prime<I>(
    ideal: &I,
    w0: Place,
    bounds: &PlaceBoundVector,
    config: &SearchConfig,
) -> Result<IdealWitness<I::Element>>
where
    I: IdealLattice + ?Sized,
{
    search_body(ideal, &ConvexBodyLtPrime::new(bounds.clone(), w0)?, config)
}

/// Nonzero `a` in the ideal with `Σ_w mult(w)·|a|_w <= B`, hence
/// `|N(a)| <= (B/n)^n` by the inequality of arithmetic and geometric means.
///
/// Requires `minkowski_bound <= vol(ConvexBodySum(B))`.
pub fn exists_ne_zero_mem_ideal_of_norm_le<I>(
    ideal: &I,
    bound: f64,
    config: &SearchConfig,
) -> Result<NormBoundedWitness<I::Element>>
where
    I: IdealLattice + ?Sized,
{
    let body = ConvexBodySum::new(ideal.signature(), bound)?;
    let witness = search_body(ideal, &body, config)?;
    let n = ideal.degree() as f64;
    Ok(NormBoundedWitness {
        witness,
        norm_bound: (bound / n).powf(n),
    })
}

/// Whether the n complex embeddings of the point are pairwise distinct,
/// i.e. whether the element it represents generates the field.
pub fn is_primitive_embedding(point: &MixedPoint, tolerance: f64) -> bool {
    let values = point.embeddings();
    values.iter().enumerate().all(|(i, a)| {
        values[i + 1..]
            .iter()
            .all(|b| (a - b).norm() > tolerance)
    })
}

/// A primitive element of the field whose embeddings are all bounded.
///
/// `ring` is the lattice of the ring of integers. For a real place `w0` the
/// search uses bound `B` at `w0` and `1` elsewhere and needs
/// `minkowski_bound < 2^r1·π^r2·B`; the result satisfies `|a|_w < max(B, 1)`.
/// For a complex place it uses ConvexBodyLT' with `√B` at `w0` and needs
/// `minkowski_bound < 2^(r1+2)·π^(r2-1)·B`; the result satisfies
/// `|a|_w < √(1 + B²)`.
///
/// A nonzero algebraic integer has |N(a)| >= 1, so being small at every
/// other place forces it to be large at `w0`; its `w0` embedding then differs
/// from every other, which makes it primitive.
pub fn exists_primitive_element_lt<I>(
    ring: &I,
    w0: Place,
    bound: f64,
    config: &SearchConfig,
) -> Result<PrimitiveWitness<I::Element>>
where
    I: IdealLattice + ?Sized,
{
    let signature = ring.signature();
    signature.check_place(w0)?;
    if !bound.is_finite() || bound <= 0.0 {
        return Err(GeometryError::InvalidDomain(format!(
            "primitive element bound must be positive and finite, got {}",
            bound
        )));
    }

    let (witness, embedding_bound) = match w0 {
        Place::Real(_) => {
            let bounds =
                PlaceBoundVector::from_fn(signature, |w| if w == w0 { bound } else { 1.0 })?;
            let witness = exists_ne_zero_mem_ideal_lt(ring, &bounds, config)?;
            (witness, bound.max(1.0))
        }
        Place::Complex(_) => {
            let root = bound.sqrt();
            let bounds =
                PlaceBoundVector::from_fn(signature, |w| if w == w0 { root } else { 1.0 })?;
            let witness = exists_ne_zero_mem_ideal_lt_prime(ring, w0, &bounds, config)?;
            (witness, (1.0 + bound * bound).sqrt())
        }
    };

    if !is_primitive_embedding(&witness.point, config.primitive_tolerance) {
        error!(place = %w0, "short element of the ring of integers is not primitive");
        return Err(GeometryError::InternalInvariantViolation(format!(
            "element found for {} has coinciding embeddings",
            w0
        )));
    }

    Ok(PrimitiveWitness {
        witness,
        embedding_bound,
    })
}
