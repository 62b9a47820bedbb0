/// Nonzero ideal elements in ConvexBodyLT, ConvexBodyLT' and ConvexBodySum.
///
/// Every returned element is checked through the fixture's own embedding,
/// so these tests catch a search that reports points outside the region or
/// a lift that returns the wrong element.

use super::fields::{
    GaussianIdeal, GaussianInt, PureCubicRing, RationalIdeal, RealQuadraticIdeal, Unliftable,
};
use crate::adjust::adjust_bound;
use crate::bounds::PlaceBoundVector;
use crate::config::SearchConfig;
use crate::error::GeometryError;
use crate::minkowski::minkowski_bound;
use crate::region::sum_gauge;
use crate::signature::Place;
use crate::volume::{convex_body_lt_volume, convex_body_sum_volume};
use crate::witness::{
    exists_ne_zero_mem_ideal_lt, exists_ne_zero_mem_ideal_lt_prime,
    exists_ne_zero_mem_ideal_of_norm_le, IdealLattice,
};
use std::f64::consts::PI;

#[test]
fn test_rational_ideal_lt() {
    let ideal = RationalIdeal { generator: 3 };
    let bounds = PlaceBoundVector::constant(ideal.signature(), 4.0).unwrap();

    // vol = 2·4 = 8 > 2·3
    let witness = exists_ne_zero_mem_ideal_lt(&ideal, &bounds, &SearchConfig::default())
        .expect("volume 8 exceeds the Minkowski bound 6");
    assert!(witness.element == 3 || witness.element == -3);
    assert_eq!(ideal.embed(&witness.element), witness.point);
}

#[test]
fn test_rational_ideal_lt_too_small() {
    let ideal = RationalIdeal { generator: 3 };
    let bounds = PlaceBoundVector::constant(ideal.signature(), 2.9).unwrap();

    match exists_ne_zero_mem_ideal_lt(&ideal, &bounds, &SearchConfig::default()) {
        Err(GeometryError::PreconditionViolated { volume, bound }) => {
            assert!((volume - 5.8).abs() < 1e-12);
            assert!((bound - 6.0).abs() < 1e-12);
        }
        other => panic!("expected PreconditionViolated, got {:?}", other),
    }
}

#[test]
fn test_gaussian_ideal_lt() {
    // (2 + i) has norm 5, so the Minkowski bound is 20 < π·2.6²
    let ideal = GaussianIdeal::new(2, 1);
    let bounds = PlaceBoundVector::constant(ideal.signature(), 2.6).unwrap();
    assert!(convex_body_lt_volume(&bounds) > minkowski_bound(ideal.covolume(), 2));

    let witness = exists_ne_zero_mem_ideal_lt(&ideal, &bounds, &SearchConfig::default())
        .expect("disk of radius 2.6 contains a generator of (2 + i)");
    let a = witness.element;
    assert!(!a.is_zero());
    assert!(a.is_multiple_of(&ideal.generator));
    assert!((a.norm() as f64).sqrt() < 2.6);
    // only associates of the generator are that short
    assert_eq!(a.norm(), 5);
}

#[test]
fn test_gaussian_ideal_lt_prime() {
    // (1 + i): bound 2·4 = 8 < 2^2·1.5²
    let ideal = GaussianIdeal::new(1, 1);
    let w0 = Place::Complex(0);
    let bounds = PlaceBoundVector::constant(ideal.signature(), 1.5).unwrap();

    let witness = exists_ne_zero_mem_ideal_lt_prime(&ideal, w0, &bounds, &SearchConfig::default())
        .expect("rectangle of area 9 exceeds the Minkowski bound 8");
    let a = witness.element;
    assert!(a.is_multiple_of(&ideal.generator));
    assert!((a.re as f64).abs() < 1.0);
    assert!((a.im as f64).abs() < 2.25);
    assert_eq!(a, GaussianInt::new(0, 2 * a.im.signum()));
}

#[test]
fn test_lt_prime_rejects_real_place() {
    let ring = RealQuadraticIdeal::ring(2);
    let bounds = PlaceBoundVector::constant(ring.signature(), 10.0).unwrap();
    assert!(matches!(
        exists_ne_zero_mem_ideal_lt_prime(&ring, Place::Real(0), &bounds, &SearchConfig::default()),
        Err(GeometryError::InvalidParameters(_))
    ));
    assert!(matches!(
        exists_ne_zero_mem_ideal_lt_prime(&ring, Place::Complex(0), &bounds, &SearchConfig::default()),
        Err(GeometryError::InvalidPlace { .. })
    ));
}

#[test]
fn test_cubic_ring_lt() {
    let ring = PureCubicRing;
    let c = 1.9;
    let bounds = PlaceBoundVector::constant(ring.signature(), c).unwrap();
    // 2π·1.9³ ≈ 43.1 > 8·3√3 ≈ 41.6
    assert!(convex_body_lt_volume(&bounds) > minkowski_bound(ring.covolume(), 3));

    let witness = exists_ne_zero_mem_ideal_lt(&ring, &bounds, &SearchConfig::default())
        .expect("cube of side 1.9 satisfies the volume condition");
    assert_ne!(witness.element, [0, 0, 0]);
    let point = ring.embed(&witness.element);
    assert!(point.norm_at_place(Place::Real(0)) < c);
    assert!(point.norm_at_place(Place::Complex(0)) < c);
    // a nonzero algebraic integer has norm at least one
    assert!(witness.abs_norm() >= 1.0 - 1e-9);
}

#[test]
fn test_adjusted_bounds_feed_search() {
    let ring = PureCubicRing;
    let sig = ring.signature();
    let unit = PlaceBoundVector::constant(sig, 1.0).unwrap();

    // grow the real bound until the volume just clears the Minkowski bound
    let target = 1.01 * minkowski_bound(ring.covolume(), 3) / (2.0 * PI);
    let bounds = adjust_bound(&unit, Place::Real(0), target).unwrap();
    assert!((bounds.weighted_product() - target).abs() < 1e-9 * target);

    let witness = exists_ne_zero_mem_ideal_lt(&ring, &bounds, &SearchConfig::default())
        .expect("adjusted bounds satisfy the volume condition");
    let point = ring.embed(&witness.element);
    assert!(point.norm_at_place(Place::Complex(0)) < 1.0);
    assert!(point.norm_at_place(Place::Real(0)) < target);
}

#[test]
fn test_gaussian_ideal_norm_le() {
    let ideal = GaussianIdeal::new(2, 1);
    let bound = 5.1;
    // π·B²/4 ≈ 20.4 >= 20
    assert!(convex_body_sum_volume(&ideal.signature(), bound) >= 20.0);

    let found = exists_ne_zero_mem_ideal_of_norm_le(&ideal, bound, &SearchConfig::default())
        .expect("sum body satisfies the volume condition");
    assert!((found.norm_bound - (bound / 2.0).powi(2)).abs() < 1e-12);
    assert!(found.witness.abs_norm() <= found.norm_bound + 1e-9);
    assert!(found.witness.element.is_multiple_of(&ideal.generator));
    assert_eq!(found.witness.element.norm(), 5);
}

#[test]
fn test_quadratic_ideal_norm_le() {
    // 2Z[√2] has covolume 8√2 and Minkowski bound 32√2 ≈ 45.25
    let ideal = RealQuadraticIdeal { d: 2, scale: 2 };
    let bound = 4.8;
    assert!(convex_body_sum_volume(&ideal.signature(), bound) >= ideal.covolume() * 4.0);

    let found = exists_ne_zero_mem_ideal_of_norm_le(&ideal, bound, &SearchConfig::default())
        .expect("sum body satisfies the volume condition");
    let a = found.witness.element;
    assert!(a.a % 2 == 0 && a.b % 2 == 0);
    assert!(sum_gauge(&found.witness.point) <= bound + 1e-9);
    assert!(found.witness.abs_norm() <= found.norm_bound + 1e-9);
}

#[test]
fn test_norm_le_at_exact_volume() {
    // π·B²/4 equals the Minkowski bound 4 of Z[i]; the closed body still works
    let ring = GaussianIdeal::unit();
    let bound = (16.0 / PI).sqrt();
    let found = exists_ne_zero_mem_ideal_of_norm_le(&ring, bound, &SearchConfig::default())
        .expect("compact body at the exact bound contains a unit");
    assert_eq!(found.witness.element.norm(), 1);
}

#[test]
fn test_norm_le_rejects_bad_bound() {
    let ring = GaussianIdeal::unit();
    assert!(matches!(
        exists_ne_zero_mem_ideal_of_norm_le(&ring, f64::NAN, &SearchConfig::default()),
        Err(GeometryError::InvalidDomain(_))
    ));
    assert!(matches!(
        exists_ne_zero_mem_ideal_of_norm_le(&ring, 1.0, &SearchConfig::default()),
        Err(GeometryError::PreconditionViolated { .. })
    ));
}

#[test]
fn test_lift_failure_is_reported() {
    let ideal = Unliftable(GaussianIdeal::new(2, 1));
    let bounds = PlaceBoundVector::constant(ideal.signature(), 2.6).unwrap();
    assert!(matches!(
        exists_ne_zero_mem_ideal_lt(&ideal, &bounds, &SearchConfig::default()),
        Err(GeometryError::LiftFailed(_))
    ));
}

#[test]
fn test_witness_budget_exceeded() {
    let ring = PureCubicRing;
    let bounds = PlaceBoundVector::constant(ring.signature(), 1.9).unwrap();
    let config = SearchConfig::default().with_max_nodes(1);
    assert!(matches!(
        exists_ne_zero_mem_ideal_lt(&ring, &bounds, &config),
        Err(GeometryError::SearchBudgetExceeded { budget: 1, .. })
    ));
}

#[test]
fn test_parallel_matches_sequential_guarantees() {
    let ring = PureCubicRing;
    let bounds = PlaceBoundVector::constant(ring.signature(), 1.9).unwrap();
    let config = SearchConfig::default().with_parallel(true);

    let witness = exists_ne_zero_mem_ideal_lt(&ring, &bounds, &config)
        .expect("parallel search finds a point when the sequential one does");
    let point = ring.embed(&witness.element);
    assert!(point.norm_at_place(Place::Real(0)) < 1.9);
    assert!(point.norm_at_place(Place::Complex(0)) < 1.9);
}
