//! Explicit derivation trees rebuilt from ranked derivations.

use super::chart::Chart;
use super::item::ItemId;
use crate::error::ParseError;
use crate::grammar::Grammar;
use ccg_core::{Category, RuleType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One node of a derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationTree {
    pub category: Category,
    pub rule_type: RuleType,
    pub start: usize,
    pub end: usize,
    /// The token, at lexical leaves.
    pub word: Option<String>,
    /// Log probability of the subtree.
    pub score: f64,
    pub children: Vec<DerivationTree>,
}

impl DerivationTree {
    /// Lexical categories left to right.
    pub fn supertags(&self) -> Vec<Category> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<Category>) {
        if self.children.is_empty() {
            out.push(self.category.clone());
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(DerivationTree::depth).max().unwrap_or(0)
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{:indent$}{} {}", "", self.rule_type, self.category, indent = indent)?;
        if let Some(word) = &self.word {
            write!(f, " {}", word)?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.write_indented(f, indent + 2)?;
        }
        Ok(())
    }
}

impl fmt::Display for DerivationTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

impl Chart {
    /// Rebuild derivation `rank` of `id`. The rank must already have been
    /// produced by [`Chart::kbest`].
    pub fn derivation_tree(
        &self,
        grammar: &Grammar,
        id: ItemId,
        rank: usize,
    ) -> Result<DerivationTree, ParseError> {
        let derivation = self.ranked(id, rank)?;
        let item = self.item(id)?;
        let bp = item
            .backpointers
            .get(derivation.backpointer)
            .ok_or(ParseError::UnknownItem { item: id.0 })?;

        let mut children = Vec::new();
        if let Some(left) = bp.left {
            children.push(self.derivation_tree(grammar, left, derivation.left_rank)?);
        }
        if let Some(right) = bp.right {
            children.push(self.derivation_tree(grammar, right, derivation.right_rank)?);
        }

        let (start, end) = item.span();
        let word = children
            .is_empty()
            .then(|| self.tokens().get(start).map(|t| t.word.clone()))
            .flatten();
        Ok(DerivationTree {
            category: grammar.category(item.key.category)?,
            rule_type: item.key.rule_type,
            start,
            end,
            word,
            score: derivation.score,
            children,
        })
    }
}
