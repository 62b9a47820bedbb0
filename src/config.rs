//! Tunable parameters of the lattice point search.

use crate::error::{GeometryError, Result};

/// Parameters controlling the branch-and-bound enumeration.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Maximum number of enumeration nodes before giving up
    /// (`None` means unbounded; termination is still guaranteed)
    pub max_nodes: Option<u64>,

    /// Lovász constant used to reduce the basis before enumerating
    /// Must lie in (0.25, 1.0); values close to 1 give better pruning
    pub lll_delta: f64,

    /// Relative slack allowed below the Minkowski bound for compact regions
    pub compact_tolerance: f64,

    /// Minimum separation between embeddings for an element to count as primitive
    pub primitive_tolerance: f64,

    /// Explore independent top-level subtrees on the rayon thread pool
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_nodes: None,
            lll_delta: 0.99,
            compact_tolerance: 1e-12,
            primitive_tolerance: 1e-9,
            parallel: false,
        }
    }
}

impl SearchConfig {
    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_lll_delta(mut self, delta: f64) -> Self {
        self.lll_delta = delta;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_compact_tolerance(mut self, tolerance: f64) -> Self {
        self.compact_tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.lll_delta <= 0.25 || self.lll_delta >= 1.0 {
            return Err(GeometryError::InvalidParameters(
                "Delta must be in (0.25, 1.0)".to_string(),
            ));
        }
        if self.max_nodes == Some(0) {
            return Err(GeometryError::InvalidParameters(
                "Node budget must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("compact_tolerance", self.compact_tolerance),
            ("primitive_tolerance", self.primitive_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(GeometryError::InvalidParameters(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
