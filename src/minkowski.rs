//! The Minkowski bound and the volume comparison of the convex body theorem.
//!
//! If R is symmetric and convex and vol(R) > 2^n · covol(L), then R contains a
//! nonzero point of L. When R is also compact the inequality may be relaxed
//! to vol(R) >= 2^n · covol(L).

/// Comparison mode selected by the compactness of the region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// vol(R) > bound, valid for any symmetric convex region
    Strict,
    /// vol(R) >= bound, valid only for compact regions
    Compact,
}

/// covol(L) · 2^n.
///
/// # Arguments
/// * `covolume` - Covolume of the lattice, a positive finite real
/// * `n` - Real dimension of the ambient space
pub fn minkowski_bound(covolume: f64, n: usize) -> f64 {
    debug_assert!(covolume > 0.0 && covolume.is_finite());
    covolume * 2f64.powi(n as i32)
}

/// Whether `volume` is large enough to guarantee a nonzero lattice point.
///
/// In compact mode the comparison accepts volumes within a relative
/// `tolerance` below the bound, so that a volume equal to the bound in exact
/// arithmetic is not rejected by rounding.
pub fn exceeds_minkowski_bound(volume: f64, bound: f64, mode: SearchMode, tolerance: f64) -> bool {
    if !volume.is_finite() || !bound.is_finite() {
        return false;
    }
    match mode {
        SearchMode::Strict => volume > bound,
        SearchMode::Compact => volume >= bound * (1.0 - tolerance),
    }
}
