//! Constructive Minkowski search: find a nonzero lattice point in a convex body.
//!
//! Minkowski's theorem is existential. This module replaces it with a finite
//! branch-and-bound that always terminates:
//!
//! 1. Rescale every flattened coordinate by the bounding box half-width, so
//!    the box becomes the unit cube [-1, 1]^n, which lies inside the ball of
//!    radius √n.
//! 2. LLL-reduce the rescaled basis and compute its Gram–Schmidt data.
//! 3. Enumerate integer coefficient vectors depth-first from the last
//!    Gram–Schmidt level down (Fincke–Pohst with Schnorr–Euchner ordering),
//!    cutting every partial vector whose projected length already leaves the
//!    ball.
//! 4. At each leaf test the exact box, then the region predicate.
//!
//! Only one of ±v is visited: while all higher coefficients are zero the
//! current one is restricted to be non-negative. Since the ball encloses the
//! box, the enumeration visits every lattice point of the box, so exhausting
//! it proves that the region holds no nonzero lattice point.

use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;
use tracing::{debug, error};

use crate::config::SearchConfig;
use crate::error::{GeometryError, Result};
use crate::lattice::{gram_schmidt, Lattice, LatticeBasis};
use crate::minkowski::exceeds_minkowski_bound;
use crate::mixed_space::MixedPoint;
use crate::region::{BoundingBox, ConvexBody};
use crate::signature::Signature;

/// Relative slack on the enclosing ball radius to absorb rounding.
const RADIUS_SLACK: f64 = 1e-9;

/// Counters collected during one search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Enumeration tree nodes visited
    pub nodes_explored: u64,
    /// Complete coefficient vectors tested against the region
    pub leaves_tested: u64,
    /// Row swaps performed by the basis reduction
    pub lll_swaps: usize,
}

/// A nonzero lattice point found inside a region.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticePointWitness {
    /// The point in the mixed space
    pub point: MixedPoint,
    /// Integer coefficients with respect to the caller's basis
    pub coefficients: Vec<i64>,
    pub stats: SearchStats,
}

/// Yields the integers of [lo, hi] in order of increasing distance from `center`.
struct Zigzag {
    center: f64,
    lo: i64,
    hi: i64,
    up: i64,
    down: i64,
}

impl Zigzag {
    fn new(center: f64, lo: i64, hi: i64) -> Self {
        // the window may lie entirely on one side of the center
        let down = (center.floor() as i64).max(lo - 1).min(hi);
        Self {
            center,
            lo,
            hi,
            up: down + 1,
            down,
        }
    }
}

impl Iterator for Zigzag {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let take_down = match (self.down >= self.lo, self.up <= self.hi) {
            (false, false) => return None,
            (true, false) => true,
            (false, true) => false,
            (true, true) => self.center - self.down as f64 <= self.up as f64 - self.center,
        };
        if take_down {
            let x = self.down;
            self.down -= 1;
            Some(x)
        } else {
            let x = self.up;
            self.up += 1;
            Some(x)
        }
    }
}

struct Hit {
    reduced_coefficients: Vec<i64>,
    point: MixedPoint,
    negated: bool,
}

struct Enumerator<'a, P> {
    signature: Signature,
    mu: &'a [Vec<f64>],
    norms_sq: &'a [f64],
    rows: &'a [Vec<f64>],
    bounding_box: &'a BoundingBox,
    membership: &'a P,
    radius_sq: f64,
    budget: Option<u64>,
    nodes: &'a AtomicU64,
    leaves: &'a AtomicU64,
}

impl<'a, P> Enumerator<'a, P>
where
    P: Fn(&MixedPoint) -> bool + Sync,
{
    fn dimension(&self) -> usize {
        self.norms_sq.len()
    }

    /// Integer window and center for level k given the coefficients above it.
    fn window(&self, k: usize, coeffs: &[i64], partial_sq: f64, leading: bool) -> Option<Zigzag> {
        let center = -((k + 1)..self.dimension())
            .map(|i| coeffs[i] as f64 * self.mu[i][k])
            .sum::<f64>();
        let remaining = self.radius_sq - partial_sq;
        if remaining < 0.0 {
            return None;
        }
        let half = (remaining / self.norms_sq[k]).sqrt();
        let mut lo = (center - half).ceil() as i64;
        let hi = (center + half).floor() as i64;
        if leading {
            lo = lo.max(0);
        }
        if lo > hi {
            return None;
        }
        Some(Zigzag::new(center, lo, hi))
    }

    fn visit(&self) -> Result<()> {
        let explored = self.nodes.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(budget) = self.budget {
            if explored > budget {
                return Err(GeometryError::SearchBudgetExceeded { explored, budget });
            }
        }
        Ok(())
    }

    /// Enumerates all values of coefficient k and the subtrees below them.
    fn descend(&self, k: usize, coeffs: &mut [i64], partial_sq: f64, leading: bool) -> Result<Option<Hit>> {
        let window = match self.window(k, coeffs, partial_sq, leading) {
            Some(window) => window,
            None => return Ok(None),
        };
        let center = window.center;
        for x in window {
            let hit = self.branch(k, x, center, coeffs, partial_sq, leading)?;
            if hit.is_some() {
                return Ok(hit);
            }
        }
        coeffs[k] = 0;
        Ok(None)
    }

    /// Fixes coefficient k to `x` and explores what lies below.
    fn branch(
        &self,
        k: usize,
        x: i64,
        center: f64,
        coeffs: &mut [i64],
        partial_sq: f64,
        leading: bool,
    ) -> Result<Option<Hit>> {
        self.visit()?;
        let offset = x as f64 - center;
        let next_sq = partial_sq + offset * offset * self.norms_sq[k];
        if next_sq > self.radius_sq {
            return Ok(None);
        }
        coeffs[k] = x;
        if k == 0 {
            return Ok(self.leaf(coeffs));
        }
        self.descend(k - 1, coeffs, next_sq, leading && x == 0)
    }

    fn leaf(&self, coeffs: &[i64]) -> Option<Hit> {
        if coeffs.iter().all(|&c| c == 0) {
            return None;
        }
        self.leaves.fetch_add(1, Ordering::Relaxed);

        let mut coords = vec![0.0; self.dimension()];
        for (&c, row) in coeffs.iter().zip(self.rows.iter()) {
            if c != 0 {
                for (xi, bi) in coords.iter_mut().zip(row.iter()) {
                    *xi += c as f64 * bi;
                }
            }
        }
        if !self.bounding_box.contains_coordinates(&coords) {
            return None;
        }
        let point = MixedPoint::from_coordinates(&self.signature, &coords).ok()?;
        if (self.membership)(&point) {
            return Some(Hit {
                reduced_coefficients: coeffs.to_vec(),
                point,
                negated: false,
            });
        }
        let negated = -point;
        if (self.membership)(&negated) {
            return Some(Hit {
                reduced_coefficients: coeffs.to_vec(),
                point: negated,
                negated: true,
            });
        }
        None
    }

    fn run(&self, parallel: bool) -> Result<Option<Hit>> {
        let n = self.dimension();
        let top = n - 1;
        if !parallel {
            let mut coeffs = vec![0i64; n];
            return self.descend(top, &mut coeffs, 0.0, true);
        }

        let window = match self.window(top, &vec![0i64; n], 0.0, true) {
            Some(window) => window,
            None => return Ok(None),
        };
        let center = window.center;
        let candidates: Vec<i64> = window.collect();
        candidates
            .into_par_iter()
            .map(|x| {
                let mut coeffs = vec![0i64; n];
                self.branch(top, x, center, &mut coeffs, 0.0, true)
            })
            .find_any(|result| !matches!(result, Ok(None)))
            .unwrap_or(Ok(None))
    }
}

/// Searches the lattice spanned by `basis` for a nonzero point accepted by
/// `membership` inside `bounding_box`.
///
/// # Arguments
/// * `basis` - Generators of the lattice
/// * `membership` - Region predicate; only points inside the box are tested
/// * `bounding_box` - Closed box containing the region, with positive widths
/// * `config` - Search parameters
///
/// # Returns
/// * `Ok(Some(_))` - A nonzero lattice point accepted by the predicate
/// * `Ok(None)` - No lattice point in the box is accepted
/// * `Err(SearchBudgetExceeded)` - The node budget ran out first
pub fn find_nonzero_lattice_point<P>(
    basis: &LatticeBasis,
    membership: P,
    bounding_box: &BoundingBox,
    config: &SearchConfig,
) -> Result<Option<LatticePointWitness>>
where
    P: Fn(&MixedPoint) -> bool + Sync,
{
    config.validate()?;
    let n = basis.dimension();
    if bounding_box.dimension() != n {
        return Err(GeometryError::InvalidDimension {
            expected: n,
            got: bounding_box.dimension(),
        });
    }
    if bounding_box.half_widths().iter().any(|&h| h <= 0.0) {
        return Err(GeometryError::InvalidDomain(
            "bounding box half-widths must be positive".to_string(),
        ));
    }

    // Normalize the box to the unit cube
    let scaled: Vec<Vec<f64>> = basis
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .zip(bounding_box.half_widths().iter())
                .map(|(x, h)| x / h)
                .collect()
        })
        .collect();
    let reduction = crate::lattice::lll_reduce(&scaled, config.lll_delta)?;
    let gso = gram_schmidt(&reduction.rows);
    if gso.norms_sq.iter().any(|&v| v <= 0.0 || !v.is_finite()) {
        return Err(GeometryError::InvalidParameters(
            "lattice basis is not full rank".to_string(),
        ));
    }

    // Reduced rows in the caller's coordinates, rebuilt exactly from the transform
    let rows: Vec<Vec<f64>> = reduction
        .transform
        .iter()
        .map(|t| basis.combine(t))
        .collect();

    let nodes = AtomicU64::new(0);
    let leaves = AtomicU64::new(0);
    let enumerator = Enumerator {
        signature: basis.signature(),
        mu: &gso.mu,
        norms_sq: &gso.norms_sq,
        rows: &rows,
        bounding_box,
        membership: &membership,
        radius_sq: n as f64 * (1.0 + RADIUS_SLACK),
        budget: config.max_nodes,
        nodes: &nodes,
        leaves: &leaves,
    };

    debug!(
        dimension = n,
        lll_swaps = reduction.swaps,
        parallel = config.parallel,
        "starting lattice point enumeration"
    );
    let hit = enumerator.run(config.parallel)?;
    let stats = SearchStats {
        nodes_explored: nodes.load(Ordering::Relaxed),
        leaves_tested: leaves.load(Ordering::Relaxed),
        lll_swaps: reduction.swaps,
    };
    debug!(
        nodes = stats.nodes_explored,
        leaves = stats.leaves_tested,
        found = hit.is_some(),
        "lattice point enumeration finished"
    );

    let hit = match hit {
        Some(hit) => hit,
        None => return Ok(None),
    };
    let mut coefficients = reduction.original_coefficients(&hit.reduced_coefficients)?;
    if hit.negated {
        for c in coefficients.iter_mut() {
            *c = c.checked_neg().ok_or_else(|| {
                GeometryError::InvalidParameters("lattice coefficient overflows i64".to_string())
            })?;
        }
    }
    Ok(Some(LatticePointWitness {
        point: hit.point,
        coefficients,
        stats,
    }))
}

/// Minkowski search over a lattice and a symmetric convex body.
#[derive(Clone, Debug, Default)]
pub struct LatticePointSearch {
    config: SearchConfig,
}

impl LatticePointSearch {
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Checks the volume condition of the convex body theorem for `region`.
    ///
    /// # Returns
    /// * `Ok((volume, bound))` when the condition holds
    /// * `Err(PreconditionViolated)` otherwise
    pub fn check_precondition<R>(&self, lattice: &Lattice, region: &R) -> Result<(f64, f64)>
    where
        R: ConvexBody + ?Sized,
    {
        if region.signature() != lattice.signature() {
            return Err(GeometryError::InvalidParameters(format!(
                "region signature ({}, {}) does not match lattice signature ({}, {})",
                region.signature().r1(),
                region.signature().r2(),
                lattice.signature().r1(),
                lattice.signature().r2(),
            )));
        }
        let volume = region.volume();
        let bound = lattice.minkowski_bound();
        if !exceeds_minkowski_bound(volume, bound, region.search_mode(), self.config.compact_tolerance) {
            return Err(GeometryError::PreconditionViolated { volume, bound });
        }
        Ok((volume, bound))
    }

    /// Finds a nonzero lattice point inside `region`.
    ///
    /// Fails with `PreconditionViolated` before enumerating when the region is
    /// too small for the convex body theorem to apply. A compact region whose
    /// volume was accepted within `compact_tolerance` below the bound carries
    /// no guarantee, so an empty search there is also `PreconditionViolated`.
    /// Otherwise the search cannot legitimately come back empty; that outcome
    /// is reported as `InternalInvariantViolation`.
    pub fn find_in_region<R>(&self, lattice: &Lattice, region: &R) -> Result<LatticePointWitness>
    where
        R: ConvexBody + ?Sized,
    {
        let (volume, bound) = self.check_precondition(lattice, region)?;
        debug!(volume, bound, mode = ?region.search_mode(), "volume condition satisfied");

        let found = find_nonzero_lattice_point(
            lattice.basis(),
            |x: &MixedPoint| region.contains(x),
            &region.bounding_box(),
            &self.config,
        )?;
        match found {
            Some(witness) => Ok(witness),
            // accepted only through the compact rounding slack
            None if volume < bound => Err(GeometryError::PreconditionViolated { volume, bound }),
            None => {
                error!(volume, bound, "search exhausted despite satisfied volume condition");
                Err(GeometryError::InternalInvariantViolation(format!(
                    "no nonzero lattice point found although volume {} reaches bound {}",
                    volume, bound
                )))
            }
        }
    }
}
