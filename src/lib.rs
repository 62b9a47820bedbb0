//! Convex bodies in the mixed space of a number field and the lattice points
//! Minkowski's convex body theorem guarantees inside them.
//!
//! A number field of signature (r1, r2) embeds into R^r1 × C^r2. This crate
//! provides the three standard bodies of that space (`ConvexBodyLt`,
//! `ConvexBodyLtPrime` and `ConvexBodySum`) with exact volume constants, the
//! Minkowski bound of a lattice, and a constructive search that returns the
//! nonzero lattice point whose existence the theorem asserts. The `witness`
//! module turns that search into statements about ideals of a number field.

pub mod adjust;
pub mod bounds;
pub mod config;
pub mod error;
pub mod lattice;
pub mod minkowski;
pub mod mixed_space;
pub mod region;
pub mod search;
pub mod signature;
pub mod volume;
pub mod witness;

#[cfg(test)]
mod tests;

pub use adjust::adjust_bound;
pub use bounds::PlaceBoundVector;
pub use config::SearchConfig;
pub use error::{GeometryError, Result};
pub use lattice::{gram_schmidt, lll_reduce, GramSchmidt, Lattice, LatticeBasis, LllReduction};
pub use minkowski::{exceeds_minkowski_bound, minkowski_bound, SearchMode};
pub use mixed_space::MixedPoint;
pub use region::{
    sum_gauge, volume, BoundingBox, ConvexBody, ConvexBodyLt, ConvexBodyLtPrime, ConvexBodySum,
    ConvexRegion,
};
pub use search::{find_nonzero_lattice_point, LatticePointSearch, LatticePointWitness, SearchStats};
pub use signature::{Place, Signature};
pub use volume::{
    convex_body_lt_factor, convex_body_lt_prime_factor, convex_body_lt_prime_volume,
    convex_body_lt_volume, convex_body_sum_factor, convex_body_sum_volume, VolumeFactor,
};
pub use witness::{
    exists_ne_zero_mem_ideal_lt, exists_ne_zero_mem_ideal_lt_prime,
    exists_ne_zero_mem_ideal_of_norm_le, exists_primitive_element_lt, is_primitive_embedding,
    IdealLattice, IdealWitness, NormBoundedWitness, PrimitiveWitness,
};
