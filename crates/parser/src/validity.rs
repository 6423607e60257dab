//! The four-valued rule validity lattice.
//!
//! ```text
//!   Valid
//!     │
//!  Invalid
//!     │
//!  Unused
//!     │
//!  Unknown
//! ```
//!
//! Views from different workers are merged with [`Validity::join`], so any
//! set of workers converges on the same table regardless of merge order.

use ccg_core::{CatId, SymbolId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Classification of a rule key.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Validity {
    /// Never looked at.
    #[default]
    Unknown,
    /// Known but switched off.
    Unused,
    /// Looked at; nothing combines.
    Invalid,
    /// Combines.
    Valid,
}

impl Validity {
    /// Least upper bound.
    pub fn join(self, other: Validity) -> Validity {
        self.max(other)
    }

    /// Rules under this key may be applied.
    pub fn is_usable(self) -> bool {
        matches!(self, Validity::Valid | Validity::Unknown)
    }
}

/// What a validity entry is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKey {
    /// An ordered pair of categories.
    Binary { left: CatId, right: CatId },
    /// A unary (parent, child) pair.
    Unary { parent: CatId, child: CatId },
    /// A lexical (tag, category) pair.
    Lexical { tag: SymbolId, category: CatId },
}

/// Shared validity table; writes are joins.
#[derive(Debug, Default)]
pub struct ValidityTable {
    entries: RwLock<HashMap<RuleKey, Validity>>,
}

impl ValidityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &RuleKey) -> Validity {
        self.entries.read().get(key).copied().unwrap_or_default()
    }

    /// Join `validity` into the entry for `key`, returning the result.
    pub fn record(&self, key: RuleKey, validity: Validity) -> Validity {
        let mut entries = self.entries.write();
        let entry = entries.entry(key).or_default();
        *entry = entry.join(validity);
        *entry
    }

    /// Like [`record`](Self::record), but an entry switched off to
    /// `Unused` stays off.
    pub fn record_live(&self, key: RuleKey, validity: Validity) -> Validity {
        let mut entries = self.entries.write();
        let entry = entries.entry(key).or_default();
        if *entry != Validity::Unused {
            *entry = entry.join(validity);
        }
        *entry
    }

    /// Overwrite the entry for `key`, bypassing the join.
    pub fn set(&self, key: RuleKey, validity: Validity) {
        self.entries.write().insert(key, validity);
    }

    /// Join every entry of `other` into this table.
    pub fn join_from(&self, other: &ValidityTable) {
        let theirs = other.entries.read().clone();
        let mut ours = self.entries.write();
        for (key, validity) in theirs {
            let entry = ours.entry(key).or_default();
            *entry = entry.join(validity);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries with the given classification.
    pub fn count(&self, validity: Validity) -> usize {
        self.entries
            .read()
            .values()
            .filter(|v| **v == validity)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Validity; 4] = [
        Validity::Unknown,
        Validity::Unused,
        Validity::Invalid,
        Validity::Valid,
    ];

    #[test]
    fn test_join_order() {
        assert_eq!(Validity::Valid.join(Validity::Invalid), Validity::Valid);
        assert_eq!(Validity::Invalid.join(Validity::Unused), Validity::Invalid);
        assert_eq!(Validity::Unused.join(Validity::Unknown), Validity::Unused);
    }

    #[test]
    fn test_join_is_semilattice() {
        for a in ALL {
            assert_eq!(a.join(a), a);
            for b in ALL {
                assert_eq!(a.join(b), b.join(a));
                for c in ALL {
                    assert_eq!(a.join(b).join(c), a.join(b.join(c)));
                }
            }
        }
    }

    #[test]
    fn test_table_views_converge() {
        let key = RuleKey::Binary {
            left: CatId(0),
            right: CatId(1),
        };
        let other = RuleKey::Unary {
            parent: CatId(2),
            child: CatId(0),
        };

        let a = ValidityTable::new();
        a.record(key, Validity::Invalid);
        let b = ValidityTable::new();
        b.record(key, Validity::Valid);
        b.record(other, Validity::Unused);

        let merged_ab = ValidityTable::new();
        merged_ab.join_from(&a);
        merged_ab.join_from(&b);
        let merged_ba = ValidityTable::new();
        merged_ba.join_from(&b);
        merged_ba.join_from(&a);

        for k in [key, other] {
            assert_eq!(merged_ab.get(&k), merged_ba.get(&k));
        }
        assert_eq!(merged_ab.get(&key), Validity::Valid);
        assert_eq!(merged_ab.count(Validity::Unused), 1);
    }

    #[test]
    fn test_set_bypasses_join() {
        let key = RuleKey::Binary {
            left: CatId(0),
            right: CatId(0),
        };
        let table = ValidityTable::new();
        table.record(key, Validity::Valid);
        table.set(key, Validity::Unused);
        assert_eq!(table.get(&key), Validity::Unused);
        assert!(!table.get(&key).is_usable());
    }
}
