//! Error types for parsing.
//!
//! Two classes of failure reach callers. Fatal variants signal corrupted
//! state (an interning collision, a probability outside `(0, 1]`, a k-best
//! rank read before it was computed) and must abort the current EM
//! iteration. The rest describe bad input for a single sentence.
//!
//! A sentence with no spanning root item is *not* an error; its chart
//! simply reports zero parses.

use ccg_core::CategoryError;
use ccg_prob::ProbError;
use thiserror::Error;

/// Errors that can occur while building or reading a chart.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// Category algebra failure.
    #[error(transparent)]
    Category(#[from] CategoryError),

    /// Probability failure.
    #[error(transparent)]
    Prob(#[from] ProbError),

    /// A k-best rank was read before it was computed.
    #[error("Rank {rank} of item {item} has not been computed")]
    RankNotComputed { item: u32, rank: usize },

    /// An item id outside the chart.
    #[error("Unknown chart item {item}")]
    UnknownItem { item: u32 },

    /// Nothing to parse.
    #[error("Cannot parse empty sentence")]
    EmptySentence,

    /// A token not of the form `word/TAG`.
    #[error("Malformed token: '{token}'")]
    MalformedToken { token: String },

    /// A bracket or entity span outside the sentence.
    #[error("Span [{start}, {end}] does not fit a sentence of {len} tokens")]
    InvalidSpan { start: usize, end: usize, len: usize },

    /// Configuration could not be loaded.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Chart (de)serialization failed.
    #[error("Chart persistence failed: {reason}")]
    Persistence { reason: String },
}

impl ParseError {
    /// Whether this error indicates corrupted state rather than bad input.
    pub fn is_fatal(&self) -> bool {
        match self {
            ParseError::Category(CategoryError::InvalidConfig { .. }) => false,
            ParseError::Category(_) => true,
            ParseError::Prob(_)
            | ParseError::RankNotComputed { .. }
            | ParseError::UnknownItem { .. } => true,
            ParseError::EmptySentence
            | ParseError::MalformedToken { .. }
            | ParseError::InvalidSpan { .. }
            | ParseError::InvalidConfig { .. }
            | ParseError::Persistence { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let collision = ParseError::from(CategoryError::InternCollision {
            fingerprint: 1,
            existing: "NP".into(),
            incoming: "S".into(),
        });
        assert!(collision.is_fatal());
        assert!(ParseError::from(ProbError::InvalidProbability { log_value: 0.5 }).is_fatal());
        assert!(ParseError::RankNotComputed { item: 0, rank: 3 }.is_fatal());
        assert!(!ParseError::EmptySentence.is_fatal());
        assert!(!ParseError::MalformedToken { token: "x".into() }.is_fatal());
    }
}
