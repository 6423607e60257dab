//! Error types for induction and training.

use ccg_core::CategoryError;
use ccg_parser::ParseError;
use ccg_prob::ProbError;
use thiserror::Error;

/// Errors that can occur while seeding, inducing or training.
#[derive(Debug, Clone, Error)]
pub enum InductionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Category(#[from] CategoryError),

    #[error(transparent)]
    Prob(#[from] ProbError),

    /// A worker failed on one sentence; the whole iteration is abandoned.
    #[error("Sentence {index} failed in iteration {iteration}: {source}")]
    Sentence {
        iteration: usize,
        index: usize,
        #[source]
        source: ParseError,
    },

    /// The worker pool could not be started.
    #[error("Failed to build worker pool: {reason}")]
    WorkerPool { reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Training corpus is empty")]
    EmptyCorpus,
}

impl InductionError {
    /// Whether this error indicates corrupted shared state.
    pub fn is_fatal(&self) -> bool {
        match self {
            InductionError::Parse(e) | InductionError::Sentence { source: e, .. } => e.is_fatal(),
            InductionError::Category(CategoryError::InvalidConfig { .. }) => false,
            InductionError::Category(_) | InductionError::Prob(_) => true,
            InductionError::WorkerPool { .. }
            | InductionError::InvalidConfig { .. }
            | InductionError::EmptyCorpus => false,
        }
    }
}
