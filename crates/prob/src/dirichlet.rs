//! Dirichlet-smoothed relative frequencies.
//!
//! With concentration `α` and a uniform base measure over `N` outcomes:
//!
//! ```text
//! P(o | p) = (c(p, o) + α / N) / (c(p) + α)
//! ```
//!
//! Every outcome in the base receives non-zero mass, and the distribution
//! over the `N` outcomes sums to one.

use crate::counts::ConditionalCounts;
use crate::error::ProbError;
use crate::logspace::validate;
use std::hash::Hash;

/// Smoothed conditional distribution over a count table.
#[derive(Debug, Clone)]
pub struct DirichletModel<P, O> {
    counts: ConditionalCounts<P, O>,
    alpha: f64,
}

impl<P: Eq + Hash + Clone, O: Eq + Hash + Clone> DirichletModel<P, O> {
    /// # Errors
    ///
    /// Returns an error if `alpha` is not positive.
    pub fn new(alpha: f64) -> Result<Self, ProbError> {
        Self::from_counts(ConditionalCounts::new(), alpha)
    }

    pub fn from_counts(counts: ConditionalCounts<P, O>, alpha: f64) -> Result<Self, ProbError> {
        if !(alpha > 0.0 && alpha.is_finite()) {
            return Err(ProbError::InvalidConcentration { alpha });
        }
        Ok(Self { counts, alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn counts(&self) -> &ConditionalCounts<P, O> {
        &self.counts
    }

    /// Replace the counts, as at the end of an M-step.
    pub fn set_counts(&mut self, counts: ConditionalCounts<P, O>) {
        self.counts = counts;
    }

    /// `P(outcome | parent)` with `base_size` possible outcomes.
    pub fn probability(&self, parent: &P, outcome: &O, base_size: usize) -> Result<f64, ProbError> {
        if base_size == 0 {
            return Err(ProbError::EmptyBase);
        }
        let numerator = self.counts.get(parent, outcome) + self.alpha / base_size as f64;
        let denominator = self.counts.total(parent) + self.alpha;
        Ok(numerator / denominator)
    }

    /// `ln P(outcome | parent)`, checked to lie in `(0, 1]`.
    pub fn log_probability(
        &self,
        parent: &P,
        outcome: &O,
        base_size: usize,
    ) -> Result<f64, ProbError> {
        validate(self.probability(parent, outcome, base_size)?.ln())
    }
}
