//! Full-rank lattices in the flattened mixed space.
//!
//! A lattice is given by n generator rows b_0, …, b_{n-1} in R^n (flattened
//! mixed coordinates) and its covolume |det B|. The search layer needs three
//! things from this module: Gram–Schmidt data, an LLL-reduced basis together
//! with the unimodular transform back to the caller's basis, and conversion
//! between integer coefficient vectors and mixed points.

use tracing::{trace, warn};

use crate::error::{GeometryError, Result};
use crate::minkowski::minkowski_bound;
use crate::mixed_space::MixedPoint;
use crate::signature::Signature;

/// Pivots below this magnitude (relative to the largest entry) count as zero.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Swap cap for LLL; reduction quality only affects search speed, so the
/// partially reduced basis is still usable if the cap is hit.
const LLL_MAX_SWAPS_PER_DIM_SQ: usize = 10_000;

/// Gram–Schmidt orthogonalization of a row basis.
#[derive(Clone, Debug)]
pub struct GramSchmidt {
    /// Orthogonal vectors b*_i
    pub orthogonal: Vec<Vec<f64>>,
    /// Projection coefficients μ[i][j] = ⟨b_i, b*_j⟩ / ||b*_j||² for j < i
    pub mu: Vec<Vec<f64>>,
    /// Squared norms ||b*_i||²
    pub norms_sq: Vec<f64>,
}

/// Result of LLL reduction.
#[derive(Clone, Debug)]
pub struct LllReduction {
    /// Reduced rows
    pub rows: Vec<Vec<f64>>,
    /// Unimodular transform U with reduced_i = Σ_j U[i][j] · original_j
    pub transform: Vec<Vec<i64>>,
    /// Number of row swaps performed
    pub swaps: usize,
}

impl LllReduction {
    /// Maps coefficients with respect to the reduced rows back to
    /// coefficients with respect to the original rows.
    ///
    /// Fails with `InvalidParameters` if a coefficient does not fit in `i64`.
    pub fn original_coefficients(&self, reduced: &[i64]) -> Result<Vec<i64>> {
        let n = self.transform.len();
        (0..n)
            .map(|j| {
                (0..n)
                    .try_fold(0i64, |acc, i| {
                        reduced[i]
                            .checked_mul(self.transform[i][j])
                            .and_then(|term| acc.checked_add(term))
                    })
                    .ok_or_else(transform_overflow)
            })
            .collect()
    }
}

fn transform_overflow() -> GeometryError {
    GeometryError::InvalidParameters("unimodular transform overflows i64".to_string())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Gram–Schmidt over arbitrary rows.
pub fn gram_schmidt(rows: &[Vec<f64>]) -> GramSchmidt {
    let n = rows.len();
    let mut orthogonal = rows.to_vec();
    let mut mu = vec![vec![0.0; n]; n];
    let mut norms_sq = vec![0.0; n];

    for i in 0..n {
        for j in 0..i {
            mu[i][j] = if norms_sq[j] == 0.0 {
                0.0
            } else {
                dot(&rows[i], &orthogonal[j]) / norms_sq[j]
            };
            let coef = mu[i][j];
            let (done, rest) = orthogonal.split_at_mut(i);
            for (x, y) in rest[0].iter_mut().zip(done[j].iter()) {
                *x -= coef * y;
            }
        }
        norms_sq[i] = dot(&orthogonal[i], &orthogonal[i]);
    }

    GramSchmidt {
        orthogonal,
        mu,
        norms_sq,
    }
}

/// LLL reduction of a row basis with Lovász constant `delta`.
///
/// # Algorithm
/// 1. Size-reduce b_k against b_{k-1}, …, b_0 so that |μ[k][j]| <= 1/2
/// 2. If ||b*_k||² >= (δ - μ[k][k-1]²)·||b*_{k-1}||² advance, otherwise swap
///    b_k with b_{k-1} and step back
pub fn lll_reduce(rows: &[Vec<f64>], delta: f64) -> Result<LllReduction> {
    if delta <= 0.25 || delta >= 1.0 {
        return Err(GeometryError::InvalidParameters(
            "Delta must be in (0.25, 1.0)".to_string(),
        ));
    }

    let n = rows.len();
    let mut basis = rows.to_vec();
    let mut transform: Vec<Vec<i64>> = (0..n)
        .map(|i| (0..n).map(|j| i64::from(i == j)).collect())
        .collect();
    let mut gso = gram_schmidt(&basis);
    let mut swaps = 0usize;
    let max_swaps = LLL_MAX_SWAPS_PER_DIM_SQ * n.max(1) * n.max(1);

    let mut k = 1;
    while k < n {
        // Size reduction
        for j in (0..k).rev() {
            let mu = gso.mu[k][j];
            if mu.abs() > 0.5 {
                let r = mu.round();
                if !r.is_finite() || r.abs() >= i64::MAX as f64 {
                    return Err(transform_overflow());
                }
                let ri = r as i64;
                let (head, tail) = basis.split_at_mut(k);
                for (x, y) in tail[0].iter_mut().zip(head[j].iter()) {
                    *x -= r * y;
                }
                let (head, tail) = transform.split_at_mut(k);
                for (x, y) in tail[0].iter_mut().zip(head[j].iter()) {
                    let current = *x;
                    *x = ri
                        .checked_mul(*y)
                        .and_then(|step| current.checked_sub(step))
                        .ok_or_else(transform_overflow)?;
                }
                for l in 0..j {
                    gso.mu[k][l] -= r * gso.mu[j][l];
                }
                gso.mu[k][j] -= r;
            }
        }

        // Lovász condition
        let mu = gso.mu[k][k - 1];
        if gso.norms_sq[k] >= (delta - mu * mu) * gso.norms_sq[k - 1] {
            k += 1;
        } else {
            basis.swap(k, k - 1);
            transform.swap(k, k - 1);
            gso = gram_schmidt(&basis);
            swaps += 1;
            trace!(k, swaps, "LLL swap");
            if swaps >= max_swaps {
                warn!(swaps, "LLL swap cap reached, continuing with partially reduced basis");
                break;
            }
            k = (k - 1).max(1);
        }
    }

    Ok(LllReduction {
        rows: basis,
        transform,
        swaps,
    })
}

/// Solves the square system `matrix · x = rhs` by Gaussian elimination with
/// partial pivoting.
fn solve(matrix: &[Vec<f64>], rhs: &[f64]) -> Result<Vec<f64>> {
    let n = matrix.len();
    let scale = matrix
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0f64, |acc, x| acc.max(x.abs()))
        .max(f64::MIN_POSITIVE);
    let mut a: Vec<Vec<f64>> = matrix
        .iter()
        .zip(rhs.iter())
        .map(|(row, &b)| {
            let mut r = row.clone();
            r.push(b);
            r
        })
        .collect();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() <= SINGULAR_EPSILON * scale {
            return Err(GeometryError::InvalidParameters(
                "lattice basis is not full rank".to_string(),
            ));
        }
        a.swap(col, pivot);
        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor != 0.0 {
                for c in col..=n {
                    a[row][c] -= factor * a[col][c];
                }
            }
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|c| a[row][c] * x[c]).sum();
        x[row] = (a[row][n] - tail) / a[row][row];
    }
    Ok(x)
}

/// Generator rows of a full-rank lattice in flattened mixed coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeBasis {
    signature: Signature,
    rows: Vec<Vec<f64>>,
}

impl LatticeBasis {
    /// # Arguments
    /// * `signature` - Signature fixing the ambient space
    /// * `rows` - Exactly n rows of n finite reals, n = `signature.degree()`
    pub fn new(signature: Signature, rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = signature.degree();
        if rows.len() != n {
            return Err(GeometryError::InvalidDimension {
                expected: n,
                got: rows.len(),
            });
        }
        for row in &rows {
            if row.len() != n {
                return Err(GeometryError::InvalidDimension {
                    expected: n,
                    got: row.len(),
                });
            }
            if row.iter().any(|x| !x.is_finite()) {
                return Err(GeometryError::InvalidDomain(
                    "lattice generators must have finite coordinates".to_string(),
                ));
            }
        }
        Ok(Self { signature, rows })
    }

    /// Builds the basis from generator points of the mixed space.
    pub fn from_points(signature: Signature, points: &[MixedPoint]) -> Result<Self> {
        let rows = points.iter().map(MixedPoint::to_coordinates).collect();
        Self::new(signature, rows)
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    pub fn dimension(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn transpose(&self) -> Vec<Vec<f64>> {
        let n = self.rows.len();
        (0..n)
            .map(|j| (0..n).map(|i| self.rows[i][j]).collect())
            .collect()
    }

    /// Determinant of the generator matrix.
    pub fn determinant(&self) -> f64 {
        let n = self.rows.len();
        let mut a = self.rows.clone();
        let mut det = 1.0;
        for col in 0..n {
            let pivot = (col..n)
                .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
                .unwrap_or(col);
            if a[pivot][col] == 0.0 {
                return 0.0;
            }
            if pivot != col {
                a.swap(col, pivot);
                det = -det;
            }
            det *= a[col][col];
            for row in (col + 1)..n {
                let factor = a[row][col] / a[col][col];
                for c in col..n {
                    a[row][c] -= factor * a[col][c];
                }
            }
        }
        det
    }

    pub fn gram_schmidt(&self) -> GramSchmidt {
        gram_schmidt(&self.rows)
    }

    pub fn lll_reduce(&self, delta: f64) -> Result<LllReduction> {
        lll_reduce(&self.rows, delta)
    }

    /// Flattened coordinates of Σ c_i b_i.
    pub fn combine(&self, coefficients: &[i64]) -> Vec<f64> {
        let n = self.rows.len();
        let mut x = vec![0.0; n];
        for (c, row) in coefficients.iter().zip(self.rows.iter()) {
            if *c != 0 {
                let c = *c as f64;
                for (xi, bi) in x.iter_mut().zip(row.iter()) {
                    *xi += c * bi;
                }
            }
        }
        x
    }

    /// The lattice point Σ c_i b_i as a mixed point.
    pub fn point(&self, coefficients: &[i64]) -> Result<MixedPoint> {
        if coefficients.len() != self.rows.len() {
            return Err(GeometryError::InvalidDimension {
                expected: self.rows.len(),
                got: coefficients.len(),
            });
        }
        MixedPoint::from_coordinates(&self.signature, &self.combine(coefficients))
    }

    /// Real coefficients c with Σ c_i b_i = x.
    pub fn coefficients_of(&self, x: &MixedPoint) -> Result<Vec<f64>> {
        let coords = x.to_coordinates();
        if coords.len() != self.rows.len() {
            return Err(GeometryError::InvalidDimension {
                expected: self.rows.len(),
                got: coords.len(),
            });
        }
        solve(&self.transpose(), &coords)
    }

    /// Integer coefficients of `x` if it is a lattice point up to `tolerance`.
    pub fn integer_coefficients_of(&self, x: &MixedPoint, tolerance: f64) -> Result<Option<Vec<i64>>> {
        let real = self.coefficients_of(x)?;
        if real.iter().all(|c| (c - c.round()).abs() <= tolerance) {
            Ok(Some(real.iter().map(|c| c.round() as i64).collect()))
        } else {
            Ok(None)
        }
    }
}

/// A full-rank lattice together with its covolume.
#[derive(Clone, Debug, PartialEq)]
pub struct Lattice {
    basis: LatticeBasis,
    covolume: f64,
}

impl Lattice {
    /// Pairs a basis with an externally known covolume.
    pub fn new(basis: LatticeBasis, covolume: f64) -> Result<Self> {
        if !covolume.is_finite() || covolume <= 0.0 {
            return Err(GeometryError::InvalidDomain(format!(
                "covolume must be a positive finite real, got {}",
                covolume
            )));
        }
        Ok(Self { basis, covolume })
    }

    /// Derives the covolume as |det B|; fails for degenerate bases.
    pub fn from_basis(basis: LatticeBasis) -> Result<Self> {
        let covolume = basis.determinant().abs();
        let scale: f64 = basis
            .rows()
            .iter()
            .map(|row| dot(row, row).sqrt())
            .product();
        if covolume <= SINGULAR_EPSILON * scale {
            return Err(GeometryError::InvalidParameters(
                "lattice basis is not full rank".to_string(),
            ));
        }
        Self::new(basis, covolume)
    }

    pub fn basis(&self) -> &LatticeBasis {
        &self.basis
    }

    pub fn covolume(&self) -> f64 {
        self.covolume
    }

    pub fn signature(&self) -> Signature {
        self.basis.signature()
    }

    pub fn minkowski_bound(&self) -> f64 {
        minkowski_bound(self.covolume, self.basis.dimension())
    }
}
