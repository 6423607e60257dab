//! Count-based rule model.
//!
//! ```text
//! P(rule | parent) = (c(parent, rule) + α / N) / (c(parent) + α)
//! ```
//!
//! `N` is the number of outcomes the grammar has registered for the
//! parent, read when the rule is scored. Every outcome a chart can use is
//! registered before scoring, so the distribution over the outcomes the
//! chart sees never exceeds one. The trainer scores only once every chart
//! of an iteration is built, so `N` is the same for all workers.

use ccg_core::{CatId, Rule};
use ccg_parser::{ExpectedCounts, Grammar, ParseError, Scorer};
use ccg_prob::{DirichletModel, ProbError};

/// Dirichlet-smoothed relative frequencies over expected rule counts.
#[derive(Debug, Clone)]
pub struct CountModel {
    model: DirichletModel<CatId, Rule>,
    /// Minimum expected count for a rule to be used at test time.
    min_count: f64,
}

impl CountModel {
    pub fn new(alpha: f64) -> Result<Self, ProbError> {
        Ok(Self {
            model: DirichletModel::new(alpha)?,
            min_count: 0.0,
        })
    }

    pub fn with_min_count(mut self, min_count: f64) -> Self {
        self.min_count = min_count;
        self
    }

    pub fn alpha(&self) -> f64 {
        self.model.alpha()
    }

    pub fn counts(&self) -> &ExpectedCounts {
        self.model.counts()
    }

    /// M-step: replace the counts with this iteration's expectations.
    pub fn reestimate(&mut self, counts: ExpectedCounts) {
        self.model.set_counts(counts);
    }
}

impl Scorer for CountModel {
    fn probability(&self, grammar: &Grammar, parent: CatId, rule: &Rule) -> Result<f64, ParseError> {
        let outcomes = grammar.expansions(parent);
        Ok(self.model.log_probability(&parent, rule, outcomes)?)
    }

    /// A rule is needed at test time once training gave it more than the
    /// minimum expected count. Before any training every rule is.
    fn is_rule_required(&self, rule: &Rule) -> bool {
        let counts = self.model.counts();
        counts.is_empty() || counts.get(&rule.parent(), rule) > self.min_count
    }
}
