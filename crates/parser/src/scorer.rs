//! The contract between the chart and a probability model.

use crate::error::ParseError;
use crate::grammar::Grammar;
use ccg_core::{CatId, Rule};
use ccg_prob::{validate, ConditionalCounts, ProbError};

/// Expected rule counts `c(parent, rule)` gathered in the E-step.
pub type ExpectedCounts = ConditionalCounts<CatId, Rule>;

/// A rule probability model.
///
/// A backpointer is scored by its rule under the parent item's category
/// alone. Spans, children and the rest of the chart are not visible, so
/// two backpointers with the same `(parent, rule)` always score the same.
///
/// Shared across workers, so implementations must be thread-safe.
pub trait Scorer: Send + Sync {
    /// `ln P(rule | parent)`.
    fn probability(&self, grammar: &Grammar, parent: CatId, rule: &Rule)
        -> Result<f64, ParseError>;

    /// Record `weight` expected uses of `rule` under `parent`.
    fn accumulate_counts(
        &self,
        counts: &mut ExpectedCounts,
        parent: CatId,
        rule: &Rule,
        weight: f64,
    ) -> Result<(), ParseError> {
        counts.add(parent, *rule, weight)?;
        Ok(())
    }

    /// Whether `rule` may be used at test time.
    fn is_rule_required(&self, _rule: &Rule) -> bool {
        true
    }
}

/// Every known outcome of a parent is equally likely.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformScorer;

impl Scorer for UniformScorer {
    fn probability(
        &self,
        grammar: &Grammar,
        parent: CatId,
        _rule: &Rule,
    ) -> Result<f64, ParseError> {
        let outcomes = grammar.expansions(parent);
        if outcomes == 0 {
            return Err(ProbError::EmptyBase.into());
        }
        Ok(validate(-(outcomes as f64).ln())?)
    }
}
