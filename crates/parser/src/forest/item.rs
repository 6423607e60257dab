//! Chart items, their equivalence keys and backpointers.

use ccg_core::{CatId, Rule, RuleType};
use ccg_prob::{LOG_ONE, LOG_ZERO};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of an item in its chart.
///
/// Children always have smaller ids than their parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl ItemId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Which side of a constituent last absorbed punctuation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PunctHistory {
    #[default]
    None,
    /// Built by `p X → X`.
    Left,
    /// Built by `X p → X`.
    Right,
}

impl PunctHistory {
    pub fn of(rule_type: RuleType) -> Self {
        match rule_type {
            RuleType::FwPunct => PunctHistory::Left,
            RuleType::BwPunct => PunctHistory::Right,
            _ => PunctHistory::None,
        }
    }
}

/// Equivalence class of derivations.
///
/// Two derivations land in the same item exactly when every field agrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub category: CatId,
    pub start: usize,
    pub end: usize,
    pub rule_type: RuleType,
    /// Chained composition arity.
    pub arity: u8,
    pub punct: PunctHistory,
}

/// One local derivation of an item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackPointer {
    pub rule: Rule,
    pub left: Option<ItemId>,
    pub right: Option<ItemId>,
    /// `ln P(rule | parent)`, filled by the inside pass.
    pub log_prob: f64,
}

impl BackPointer {
    pub fn lexical(rule: Rule) -> Self {
        Self::new(rule, None, None)
    }

    pub fn unary(rule: Rule, child: ItemId) -> Self {
        Self::new(rule, Some(child), None)
    }

    pub fn binary(rule: Rule, left: ItemId, right: ItemId) -> Self {
        Self::new(rule, Some(left), Some(right))
    }

    fn new(rule: Rule, left: Option<ItemId>, right: Option<ItemId>) -> Self {
        Self {
            rule,
            left,
            right,
            log_prob: LOG_ONE,
        }
    }

    /// Same rule over the same children.
    pub fn same_derivation(&self, other: &BackPointer) -> bool {
        self.rule == other.rule && self.left == other.left && self.right == other.right
    }

    pub fn children(&self) -> impl Iterator<Item = ItemId> {
        self.left.into_iter().chain(self.right)
    }
}

/// An equivalence class in the chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartItem {
    pub id: ItemId,
    pub key: ItemKey,
    /// Log inside value.
    #[serde(with = "log_value")]
    pub alpha: f64,
    /// Log outside value.
    #[serde(with = "log_value")]
    pub beta: f64,
    /// Number of distinct derivations below this item.
    pub derivations: f64,
    pub backpointers: Vec<BackPointer>,
}

impl ChartItem {
    pub fn new(id: ItemId, key: ItemKey) -> Self {
        Self {
            id,
            key,
            alpha: LOG_ZERO,
            beta: LOG_ZERO,
            derivations: 0.0,
            backpointers: Vec::new(),
        }
    }

    pub fn category(&self) -> CatId {
        self.key.category
    }

    pub fn span(&self) -> (usize, usize) {
        (self.key.start, self.key.end)
    }
}

/// JSON has no infinities; `ln 0` travels as `null`.
mod log_value {
    use ccg_prob::LOG_ZERO;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(LOG_ZERO))
    }
}
