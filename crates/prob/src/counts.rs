//! Conditional expected-count tables.
//!
//! Workers each fill a private [`ConditionalCounts`] during the E-step;
//! [`ConditionalCounts::merge`] folds them into one table afterwards.

use crate::error::ProbError;
use std::collections::HashMap;
use std::hash::Hash;

/// Expected counts `c(parent, outcome)` with per-parent totals.
#[derive(Debug, Clone)]
pub struct ConditionalCounts<P, O> {
    table: HashMap<P, HashMap<O, f64>>,
    totals: HashMap<P, f64>,
}

impl<P, O> Default for ConditionalCounts<P, O> {
    fn default() -> Self {
        Self {
            table: HashMap::new(),
            totals: HashMap::new(),
        }
    }
}

impl<P: Eq + Hash + Clone, O: Eq + Hash + Clone> ConditionalCounts<P, O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` to `c(parent, outcome)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the weight is negative or not finite.
    pub fn add(&mut self, parent: P, outcome: O, weight: f64) -> Result<(), ProbError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ProbError::InvalidWeight { weight });
        }
        *self.totals.entry(parent.clone()).or_insert(0.0) += weight;
        *self
            .table
            .entry(parent)
            .or_default()
            .entry(outcome)
            .or_insert(0.0) += weight;
        Ok(())
    }

    pub fn get(&self, parent: &P, outcome: &O) -> f64 {
        self.table
            .get(parent)
            .and_then(|row| row.get(outcome))
            .copied()
            .unwrap_or(0.0)
    }

    /// `c(parent)`, the sum over all outcomes.
    pub fn total(&self, parent: &P) -> f64 {
        self.totals.get(parent).copied().unwrap_or(0.0)
    }

    /// Fold another table into this one.
    pub fn merge(&mut self, other: ConditionalCounts<P, O>) {
        for (parent, row) in other.table {
            let target = self.table.entry(parent).or_default();
            for (outcome, count) in row {
                *target.entry(outcome).or_insert(0.0) += count;
            }
        }
        for (parent, total) in other.totals {
            *self.totals.entry(parent).or_insert(0.0) += total;
        }
    }

    /// Outcomes observed under `parent`.
    pub fn outcomes(&self, parent: &P) -> impl Iterator<Item = (&O, f64)> {
        self.table
            .get(parent)
            .into_iter()
            .flat_map(|row| row.iter().map(|(o, c)| (o, *c)))
    }

    pub fn parents(&self) -> impl Iterator<Item = &P> {
        self.table.keys()
    }

    /// Number of `(parent, outcome)` cells.
    pub fn len(&self) -> usize {
        self.table.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Sum of every count in the table.
    pub fn grand_total(&self) -> f64 {
        self.totals.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_totals() {
        let mut counts = ConditionalCounts::new();
        counts.add("NP", "DT", 0.5).unwrap();
        counts.add("NP", "DT", 0.25).unwrap();
        counts.add("NP", "PRP", 1.0).unwrap();
        assert!((counts.get(&"NP", &"DT") - 0.75).abs() < 1e-9);
        assert!((counts.total(&"NP") - 1.75).abs() < 1e-9);
        assert_eq!(counts.get(&"S", &"VB"), 0.0);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_rejects_bad_weights() {
        let mut counts = ConditionalCounts::<u32, u32>::new();
        assert!(counts.add(0, 0, -1.0).is_err());
        assert!(counts.add(0, 0, f64::NAN).is_err());
        assert!(counts.is_empty());
    }

    #[test]
    fn test_merge_is_sum() {
        let mut a = ConditionalCounts::new();
        a.add(1u32, 10u32, 1.0).unwrap();
        let mut b = ConditionalCounts::new();
        b.add(1u32, 10u32, 2.0).unwrap();
        b.add(2u32, 20u32, 3.0).unwrap();

        a.merge(b);
        assert!((a.get(&1, &10) - 3.0).abs() < 1e-9);
        assert!((a.total(&2) - 3.0).abs() < 1e-9);
        assert!((a.grand_total() - 6.0).abs() < 1e-9);
    }
}
