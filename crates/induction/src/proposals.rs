//! Per-tag buffers of proposed lexical categories.
//!
//! Workers fill private buffers while they parse; the trainer folds them
//! together and merges the result into the grammar between iterations.
//! Proposals that fail the admissibility limits are dropped at merge time.

use ccg_core::{ArityLimits, Category};
use ccg_parser::{Grammar, ParseError};
use log::{debug, warn};
use std::collections::HashMap;

/// Proposed categories per tag, with the number of times each was proposed.
#[derive(Debug, Clone, Default)]
pub struct ProposalBuffer {
    by_tag: HashMap<String, HashMap<Category, usize>>,
}

/// What a merge did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub known: usize,
    /// Failed the arity limits.
    pub dropped: usize,
    /// Previously removed from the grammar.
    pub removed: usize,
}

impl ProposalBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn propose(&mut self, tag: &str, category: Category) {
        *self
            .by_tag
            .entry(tag.to_string())
            .or_default()
            .entry(category)
            .or_insert(0) += 1;
    }

    /// Times `category` was proposed for `tag`.
    pub fn count(&self, tag: &str, category: &Category) -> usize {
        self.by_tag
            .get(tag)
            .and_then(|row| row.get(category))
            .copied()
            .unwrap_or(0)
    }

    pub fn proposals(&self, tag: &str) -> impl Iterator<Item = (&Category, usize)> {
        self.by_tag
            .get(tag)
            .into_iter()
            .flat_map(|row| row.iter().map(|(c, &n)| (c, n)))
    }

    /// Number of distinct (tag, category) proposals.
    pub fn len(&self) -> usize {
        self.by_tag.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }

    /// Fold another worker's buffer into this one.
    pub fn absorb(&mut self, other: ProposalBuffer) {
        for (tag, row) in other.by_tag {
            let target = self.by_tag.entry(tag).or_default();
            for (category, n) in row {
                *target.entry(category).or_insert(0) += n;
            }
        }
    }

    /// Add every admissible proposal to the lexicon and empty the buffer.
    pub fn merge_into(
        &mut self,
        grammar: &Grammar,
        limits: &ArityLimits,
    ) -> Result<MergeReport, ParseError> {
        let mut report = MergeReport::default();
        let mut tags: Vec<_> = self.by_tag.drain().collect();
        tags.sort_by(|a, b| a.0.cmp(&b.0));

        for (tag, row) in tags {
            let known = grammar.lexical_categories(&tag)?;
            for (category, n) in row {
                if let Some(reason) = limits.rejection(&category) {
                    warn!("dropping {tag} := {category} ({n} proposals): {reason}");
                    report.dropped += 1;
                    continue;
                }
                if known.contains(&category) {
                    report.known += 1;
                    continue;
                }
                if grammar.is_removed(&tag, &category)? {
                    debug!("not restoring removed entry {tag} := {category}");
                    report.removed += 1;
                    continue;
                }
                grammar.add_lexical(&tag, &category)?;
                debug!("lexicon: {tag} := {category}");
                report.added += 1;
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccg_parser::ParserConfig;

    fn cat(text: &str) -> Category {
        text.parse().unwrap()
    }

    #[test]
    fn test_absorb_sums_counts() {
        let mut a = ProposalBuffer::new();
        a.propose("JJ", cat("N/N"));
        let mut b = ProposalBuffer::new();
        b.propose("JJ", cat("N/N"));
        b.propose("DT", cat("N/N"));

        a.absorb(b);
        assert_eq!(a.count("JJ", &cat("N/N")), 2);
        assert_eq!(a.count("DT", &cat("N/N")), 1);
        assert_eq!(a.len(), 2);
        assert_eq!(a.proposals("JJ").count(), 1);
    }

    #[test]
    fn test_merge_drops_inadmissible() {
        let grammar = Grammar::new(&ParserConfig::default()).unwrap();
        grammar.add_lexical("JJ", &cat("N/N")).unwrap();

        let mut buffer = ProposalBuffer::new();
        buffer.propose("JJ", cat("N/N"));
        buffer.propose("RB", cat("(S\\N)/(S\\N)"));
        buffer.propose("IN", cat("(N\\N)/N"));
        // modifier argument
        buffer.propose("DT", cat("N/(N/N)"));

        let report = buffer
            .merge_into(&grammar, &ArityLimits::default())
            .unwrap();
        assert_eq!(
            report,
            MergeReport {
                added: 2,
                known: 1,
                dropped: 1,
                removed: 0,
            }
        );
        assert!(buffer.is_empty());
        assert!(grammar.lexical_categories("DT").unwrap().is_empty());
        assert_eq!(grammar.lexical_categories("IN").unwrap(), vec![cat("(N\\N)/N")]);
    }

    #[test]
    fn test_merge_keeps_removed_entries_out() {
        let grammar = Grammar::new(&ParserConfig::default()).unwrap();
        let rule = grammar.add_lexical("DT", &cat("N/N")).unwrap();
        grammar.remove_rule(&rule);

        let mut buffer = ProposalBuffer::new();
        buffer.propose("DT", cat("N/N"));
        buffer.propose("DT", cat("NP/N"));
        let report = buffer
            .merge_into(&grammar, &ArityLimits::default())
            .unwrap();

        assert_eq!(report.added, 1);
        assert_eq!(report.removed, 1);
        assert_eq!(grammar.lexical_categories("DT").unwrap(), vec![cat("NP/N")]);
    }
}
