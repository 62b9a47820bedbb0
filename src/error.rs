use thiserror::Error;

use crate::signature::Place;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Invalid dimension: expected {expected}, got {got}")]
    InvalidDimension {
        expected: usize,
        got: usize,
    },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Place {place} does not exist for signature ({r1}, {r2})")]
    InvalidPlace {
        place: Place,
        r1: usize,
        r2: usize,
    },

    #[error("Division by zero: fixed bound at {place} is zero")]
    DivisionByZero { place: Place },

    #[error("Precondition violated: region volume {volume} does not exceed Minkowski bound {bound}")]
    PreconditionViolated {
        volume: f64,
        bound: f64,
    },

    #[error("Search budget exceeded: explored {explored} nodes with a budget of {budget}")]
    SearchBudgetExceeded {
        explored: u64,
        budget: u64,
    },

    #[error("Internal invariant violated: {0}")]
    InternalInvariantViolation(String),

    #[error("Lattice point could not be lifted to a field element: {0}")]
    LiftFailed(String),
}

pub type Result<T> = std::result::Result<T, GeometryError>;
