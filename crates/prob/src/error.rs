//! Error types for probability operations.

use thiserror::Error;

/// Errors that can occur in probability computations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbError {
    /// A log-probability outside `(0, 1]` in probability space.
    #[error("Invalid probability: log value {log_value} is outside (0, 1]")]
    InvalidProbability { log_value: f64 },

    /// A count contribution that is negative or not finite.
    #[error("Invalid count weight {weight}")]
    InvalidWeight { weight: f64 },

    /// Smoothing needs at least one possible outcome.
    #[error("Base measure has no outcomes")]
    EmptyBase,

    /// Concentration parameter must be positive.
    #[error("Concentration must be positive, got {alpha}")]
    InvalidConcentration { alpha: f64 },
}
