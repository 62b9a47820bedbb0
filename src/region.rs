//! The three convex body families of the mixed space and their membership tests.
//!
//! Every body here is symmetric under x ↦ -x and convex, because each one is
//! cut out by conditions of the form `h(x_w) < c` or `Σ h_w(x_w) ≤ c` with
//! every `h` an absolutely homogeneous seminorm. Membership re-expresses the
//! defining inequalities place by place; bounding boxes are derived
//! analytically so the lattice search never needs interval arithmetic.

use crate::bounds::PlaceBoundVector;
use crate::error::{GeometryError, Result};
use crate::minkowski::SearchMode;
use crate::mixed_space::MixedPoint;
use crate::signature::{Place, Signature};
use crate::volume::{
    convex_body_lt_prime_factor, convex_body_lt_volume, convex_body_sum_volume, VolumeFactor,
};

/// Axis-aligned box `|x_i| <= half_widths[i]` in flattened mixed coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    half_widths: Vec<f64>,
}

impl BoundingBox {
    pub fn new(half_widths: Vec<f64>) -> Result<Self> {
        if half_widths.is_empty() {
            return Err(GeometryError::InvalidParameters(
                "Bounding box cannot be empty".to_string(),
            ));
        }
        if let Some(&bad) = half_widths.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(GeometryError::InvalidDomain(format!(
                "bounding box half-width must be finite and non-negative, got {}",
                bad
            )));
        }
        Ok(Self { half_widths })
    }

    pub fn half_widths(&self) -> &[f64] {
        &self.half_widths
    }

    pub fn dimension(&self) -> usize {
        self.half_widths.len()
    }

    /// Closed-box membership for flattened coordinates.
    pub fn contains_coordinates(&self, coords: &[f64]) -> bool {
        coords.len() == self.half_widths.len()
            && coords
                .iter()
                .zip(self.half_widths.iter())
                .all(|(x, h)| x.abs() <= *h)
    }

    /// Volume of the box, Π 2·h_i.
    pub fn volume(&self) -> f64 {
        self.half_widths.iter().map(|h| 2.0 * h).product()
    }
}

/// A symmetric convex body in the mixed space of a fixed signature.
pub trait ConvexBody: Sync {
    fn signature(&self) -> Signature;

    /// Membership test; points of the wrong shape are never members.
    fn contains(&self, x: &MixedPoint) -> bool;

    /// Lebesgue volume of the body.
    fn volume(&self) -> f64;

    /// A closed axis-aligned box containing the body.
    fn bounding_box(&self) -> BoundingBox;

    /// Whether the body is closed and bounded, which allows the
    /// non-strict volume comparison of the convex body theorem.
    fn is_compact(&self) -> bool {
        false
    }

    fn search_mode(&self) -> SearchMode {
        if self.is_compact() {
            SearchMode::Compact
        } else {
            SearchMode::Strict
        }
    }
}

fn has_shape(signature: &Signature, x: &MixedPoint) -> bool {
    x.real.len() == signature.r1() && x.complex.len() == signature.r2()
}

/// Per-coordinate half-widths of the box Π_w {|x_w| <= f(w)}.
fn place_box_widths(bounds: &PlaceBoundVector) -> Vec<f64> {
    let signature = bounds.signature();
    let mut widths = vec![0.0; signature.degree()];
    for (w, value) in bounds.iter() {
        let offset = signature.coordinate_offset(w);
        widths[offset] = value;
        if w.is_complex() {
            widths[offset + 1] = value;
        }
    }
    widths
}

/// ConvexBodyLT(f) = { x : |x_w| < f(w) for every place w }.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexBodyLt {
    bounds: PlaceBoundVector,
}

impl ConvexBodyLt {
    pub fn new(bounds: PlaceBoundVector) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &PlaceBoundVector {
        &self.bounds
    }
}

impl ConvexBody for ConvexBodyLt {
    fn signature(&self) -> Signature {
        self.bounds.signature()
    }

    fn contains(&self, x: &MixedPoint) -> bool {
        has_shape(&self.signature(), x)
            && self
                .bounds
                .iter()
                .all(|(w, bound)| x.norm_at_place(w) < bound)
    }

    fn volume(&self) -> f64 {
        convex_body_lt_volume(&self.bounds)
    }

    fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            half_widths: place_box_widths(&self.bounds),
        }
    }
}

/// ConvexBodyLT'(f, w0): as ConvexBodyLT(f) except that at the complex place
/// w0 the disk is replaced by the rectangle |Re| < 1, |Im| < f(w0)^2.
///
/// Points of this body with large |Im| at w0 cannot come from elements that
/// are real at w0, which is what the primitive element construction uses.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexBodyLtPrime {
    bounds: PlaceBoundVector,
    w0: Place,
    factor: VolumeFactor,
}

impl ConvexBodyLtPrime {
    /// # Arguments
    /// * `bounds` - Bound at every place
    /// * `w0` - A complex place of the same signature
    pub fn new(bounds: PlaceBoundVector, w0: Place) -> Result<Self> {
        let signature = bounds.signature();
        signature.check_place(w0)?;
        if !w0.is_complex() {
            return Err(GeometryError::InvalidParameters(format!(
                "ConvexBodyLT' needs a complex place, got {}",
                w0
            )));
        }
        let factor = convex_body_lt_prime_factor(&signature)?;
        Ok(Self { bounds, w0, factor })
    }

    pub fn bounds(&self) -> &PlaceBoundVector {
        &self.bounds
    }

    pub fn special_place(&self) -> Place {
        self.w0
    }
}

impl ConvexBody for ConvexBodyLtPrime {
    fn signature(&self) -> Signature {
        self.bounds.signature()
    }

    fn contains(&self, x: &MixedPoint) -> bool {
        has_shape(&self.signature(), x)
            && self.bounds.iter().all(|(w, bound)| {
                if w == self.w0 {
                    let z = x.at_place(w);
                    z.re.abs() < 1.0 && z.im.abs() < bound * bound
                } else {
                    x.norm_at_place(w) < bound
                }
            })
    }

    fn volume(&self) -> f64 {
        self.factor
            .scale(self.bounds.weighted_product(), self.bounds.ln_weighted_product())
    }

    fn bounding_box(&self) -> BoundingBox {
        let mut half_widths = place_box_widths(&self.bounds);
        let offset = self.signature().coordinate_offset(self.w0);
        let bound = self.bounds.at(self.w0);
        half_widths[offset] = 1.0;
        half_widths[offset + 1] = bound * bound;
        BoundingBox { half_widths }
    }
}

/// The gauge g(x) = Σ_w mult(w)·|x_w| whose sub-level sets are ConvexBodySum.
///
/// # Mathematical Properties
/// - g(x) >= 0, with equality only at x = 0
/// - g(-x) = g(x) and g(t·x) = |t|·g(x)
/// - g(x + y) <= g(x) + g(y)
/// - max_w |x_w| <= g(x)
pub fn sum_gauge(x: &MixedPoint) -> f64 {
    let real: f64 = x.real.iter().map(|v| v.abs()).sum();
    let complex: f64 = x.complex.iter().map(|z| z.norm()).sum();
    real + 2.0 * complex
}

/// ConvexBodySum(B) = { x : Σ_w mult(w)·|x_w| <= B }, a closed weighted
/// cross-polytope.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexBodySum {
    signature: Signature,
    bound: f64,
}

impl ConvexBodySum {
    /// Any finite real B is accepted; B < 0 gives the empty body.
    pub fn new(signature: Signature, bound: f64) -> Result<Self> {
        if !bound.is_finite() {
            return Err(GeometryError::InvalidDomain(format!(
                "sum body bound must be finite, got {}",
                bound
            )));
        }
        Ok(Self { signature, bound })
    }

    pub fn bound(&self) -> f64 {
        self.bound
    }
}

impl ConvexBody for ConvexBodySum {
    fn signature(&self) -> Signature {
        self.signature
    }

    fn contains(&self, x: &MixedPoint) -> bool {
        has_shape(&self.signature, x) && sum_gauge(x) <= self.bound
    }

    fn volume(&self) -> f64 {
        convex_body_sum_volume(&self.signature, self.bound)
    }

    fn bounding_box(&self) -> BoundingBox {
        // |x_w| <= B at a real place, |z_w| <= B/2 at a complex one
        let b = self.bound.max(0.0);
        let mut half_widths = vec![b; self.signature.degree()];
        for width in half_widths.iter_mut().skip(self.signature.r1()) {
            *width = b / 2.0;
        }
        BoundingBox { half_widths }
    }

    fn is_compact(&self) -> bool {
        true
    }
}

/// Tagged descriptor over the three body families.
#[derive(Clone, Debug, PartialEq)]
pub enum ConvexRegion {
    Lt(ConvexBodyLt),
    LtPrime(ConvexBodyLtPrime),
    Sum(ConvexBodySum),
}

impl ConvexRegion {
    fn body(&self) -> &dyn ConvexBody {
        match self {
            ConvexRegion::Lt(body) => body,
            ConvexRegion::LtPrime(body) => body,
            ConvexRegion::Sum(body) => body,
        }
    }
}

impl ConvexBody for ConvexRegion {
    fn signature(&self) -> Signature {
        self.body().signature()
    }

    fn contains(&self, x: &MixedPoint) -> bool {
        self.body().contains(x)
    }

    fn volume(&self) -> f64 {
        self.body().volume()
    }

    fn bounding_box(&self) -> BoundingBox {
        self.body().bounding_box()
    }

    fn is_compact(&self) -> bool {
        self.body().is_compact()
    }
}

impl From<ConvexBodyLt> for ConvexRegion {
    fn from(body: ConvexBodyLt) -> Self {
        ConvexRegion::Lt(body)
    }
}

impl From<ConvexBodyLtPrime> for ConvexRegion {
    fn from(body: ConvexBodyLtPrime) -> Self {
        ConvexRegion::LtPrime(body)
    }
}

impl From<ConvexBodySum> for ConvexRegion {
    fn from(body: ConvexBodySum) -> Self {
        ConvexRegion::Sum(body)
    }
}

/// Volume of any region descriptor.
pub fn volume(region: &ConvexRegion) -> f64 {
    region.volume()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn sig(r1: usize, r2: usize) -> Signature {
        Signature::new(r1, r2).unwrap()
    }

    fn regions() -> Vec<ConvexRegion> {
        let s = sig(1, 2);
        let f = PlaceBoundVector::new(s, vec![1.5], vec![0.8, 2.0]).unwrap();
        vec![
            ConvexBodyLt::new(f.clone()).into(),
            ConvexBodyLtPrime::new(f, Place::Complex(1)).unwrap().into(),
            ConvexBodySum::new(s, 3.0).unwrap().into(),
        ]
    }

    fn point_strategy() -> impl Strategy<Value = MixedPoint> {
        prop::collection::vec(-4.0f64..4.0, 5).prop_map(|c| {
            MixedPoint::new(
                vec![c[0]],
                vec![Complex64::new(c[1], c[2]), Complex64::new(c[3], c[4])],
            )
        })
    }

    #[test]
    fn test_lt_membership_is_strict() {
        let f = PlaceBoundVector::constant(sig(2, 0), 1.0).unwrap();
        let body = ConvexBodyLt::new(f);
        assert!(body.contains(&MixedPoint::new(vec![0.5, -0.999], vec![])));
        assert!(!body.contains(&MixedPoint::new(vec![1.0, 0.0], vec![])));
        assert!(!body.contains(&MixedPoint::new(vec![0.0], vec![])));
    }

    #[test]
    fn test_lt_prime_membership() {
        let f = PlaceBoundVector::constant(sig(0, 1), 2.0).unwrap();
        let body = ConvexBodyLtPrime::new(f, Place::Complex(0)).unwrap();
        // inside the rectangle but outside the disk of radius 2
        assert!(body.contains(&MixedPoint::new(vec![], vec![Complex64::new(0.5, 3.9)])));
        assert!(!body.contains(&MixedPoint::new(vec![], vec![Complex64::new(1.0, 0.0)])));
        assert!(!body.contains(&MixedPoint::new(vec![], vec![Complex64::new(0.0, 4.0)])));
    }

    #[test]
    fn test_lt_prime_rejects_real_place() {
        let f = PlaceBoundVector::constant(sig(1, 1), 2.0).unwrap();
        assert!(matches!(
            ConvexBodyLtPrime::new(f.clone(), Place::Real(0)),
            Err(GeometryError::InvalidParameters(_))
        ));
        assert!(matches!(
            ConvexBodyLtPrime::new(f, Place::Complex(1)),
            Err(GeometryError::InvalidPlace { .. })
        ));
    }

    #[test]
    fn test_sum_membership_is_closed() {
        let body = ConvexBodySum::new(sig(1, 1), 4.0).unwrap();
        // 1 + 2·|1.5i| = 4
        assert!(body.contains(&MixedPoint::new(vec![1.0], vec![Complex64::new(0.0, 1.5)])));
        assert!(!body.contains(&MixedPoint::new(vec![1.1], vec![Complex64::new(0.0, 1.5)])));

        let empty = ConvexBodySum::new(sig(1, 1), -1.0).unwrap();
        assert!(!empty.contains(&MixedPoint::zero(&sig(1, 1))));
        let origin_only = ConvexBodySum::new(sig(1, 1), 0.0).unwrap();
        assert!(origin_only.contains(&MixedPoint::zero(&sig(1, 1))));
        assert_eq!(origin_only.volume(), 0.0);
    }

    #[test]
    fn test_bounding_boxes() {
        let s = sig(1, 1);
        let f = PlaceBoundVector::new(s, vec![2.0], vec![3.0]).unwrap();
        assert_eq!(
            ConvexBodyLt::new(f.clone()).bounding_box().half_widths(),
            &[2.0, 3.0, 3.0]
        );
        assert_eq!(
            ConvexBodyLtPrime::new(f, Place::Complex(0))
                .unwrap()
                .bounding_box()
                .half_widths(),
            &[2.0, 1.0, 9.0]
        );
        assert_eq!(
            ConvexBodySum::new(s, 4.0).unwrap().bounding_box().half_widths(),
            &[4.0, 2.0, 2.0]
        );
    }

    #[test]
    fn test_region_volume_dispatch() {
        let all = regions();
        assert!((volume(&all[0]) - 2.0 * 1.5 * std::f64::consts::PI.powi(2) * 0.64 * 4.0).abs() < 1e-9);
        assert!((volume(&all[1]) - 8.0 * std::f64::consts::PI * 1.5 * 0.64 * 4.0).abs() < 1e-9);
        assert!(all[2].is_compact());
        assert_eq!(all[0].search_mode(), SearchMode::Strict);
        assert_eq!(all[2].search_mode(), SearchMode::Compact);
    }

    #[test]
    fn test_sum_volume_monte_carlo() {
        // Hit-or-miss estimate inside the bounding box
        let body = ConvexBodySum::new(sig(1, 1), 2.0).unwrap();
        let bbox = body.bounding_box();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let samples = 200_000;
        let mut hits = 0usize;
        for _ in 0..samples {
            let coords: Vec<f64> = bbox
                .half_widths()
                .iter()
                .map(|h| rng.gen_range(-*h..=*h))
                .collect();
            let x = MixedPoint::from_coordinates(&body.signature(), &coords).unwrap();
            if body.contains(&x) {
                hits += 1;
            }
        }
        let estimate = bbox.volume() * hits as f64 / samples as f64;
        let exact = body.volume();
        assert!((estimate - exact).abs() / exact < 0.03, "{} vs {}", estimate, exact);
    }

    proptest! {
        #[test]
        fn test_negation_symmetry(x in point_strategy()) {
            for region in regions() {
                prop_assert_eq!(region.contains(&x), region.contains(&-&x));
            }
        }

        #[test]
        fn test_convexity(x in point_strategy(), y in point_strategy(), t in 0.0f64..=1.0) {
            for region in regions() {
                if region.contains(&x) && region.contains(&y) {
                    prop_assert!(region.contains(&x.lerp(&y, t)));
                }
            }
        }

        #[test]
        fn test_members_lie_in_bounding_box(x in point_strategy()) {
            for region in regions() {
                if region.contains(&x) {
                    prop_assert!(region.bounding_box().contains_coordinates(&x.to_coordinates()));
                }
            }
        }

        #[test]
        fn test_sum_gauge_properties(x in point_strategy(), y in point_strategy(), t in -3.0f64..3.0) {
            let gx = sum_gauge(&x);
            prop_assert!(gx >= 0.0);
            prop_assert!((sum_gauge(&-&x) - gx).abs() < 1e-12);
            prop_assert!((sum_gauge(&(&x * t)) - t.abs() * gx).abs() < 1e-9);
            prop_assert!(sum_gauge(&(x.clone() + &y)) <= gx + sum_gauge(&y) + 1e-9);
            prop_assert!(x.sup_norm() <= gx + 1e-12);
        }
    }
}
