//! Error types for the optimizer.
//!
//! Only construction can fail; once built, a swarm always yields a best particle.

/// Errors returned when a swarm is configured inconsistently.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimError {
    /// Lower and upper bound vectors differ in length.
    #[error("bounds have different lengths: lower {lower}, upper {upper}")]
    DimensionMismatch {
        /// Length of the lower bound vector.
        lower: usize,
        /// Length of the upper bound vector.
        upper: usize,
    },
    /// A lower bound exceeds its upper bound, or either is not finite.
    #[error("invalid bounds in dimension {index}: [{lower}, {upper}]")]
    InvalidBounds {
        /// Offending dimension.
        index: usize,
        /// Lower bound in that dimension.
        lower: f64,
        /// Upper bound in that dimension.
        upper: f64,
    },
    /// The population would be empty.
    #[error("particle count must be at least 1")]
    EmptyPopulation,
    /// The speed limit is negative or not finite.
    #[error("max speed must be non-negative and finite, got {0}")]
    InvalidMaxSpeed(f64),
}
