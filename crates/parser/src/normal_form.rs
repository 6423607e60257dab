//! Normal-form constraints on derivations.
//!
//! A normal form is a pure predicate over one derivation step: the rule
//! building the parent and the rule types that built each child. Rejected
//! steps would only re-derive, under a different bracketing, a result the
//! chart already holds.
//!
//! Policies nest: every step `Eisner` rejects is also rejected by the
//! `Full*` policies.
//!
//! | Policy | Adds |
//! |--------|------|
//! | `None` | nothing |
//! | `EisnerOriginal` | composition output is never the primary child of same-direction application or composition |
//! | `Eisner` | degree-aware version of the above, plus the secondary-child constraint |
//! | `FullNoPunctuation` | type-raising, coordination and conjoin constraints |
//! | `Full` | punctuation ordering |

use crate::forest::PunctHistory;
use ccg_core::RuleType;
use serde::{Deserialize, Serialize};

/// Normal-form policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalForm {
    None,
    EisnerOriginal,
    #[default]
    Eisner,
    FullNoPunctuation,
    Full,
}

/// One side of a derivation step.
///
/// For the parent, `arity` is the degree of the rule being applied
/// (application is degree zero). For a child it is the chained arity
/// recorded on its chart item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub rule_type: RuleType,
    pub arity: u8,
    pub punct: PunctHistory,
}

impl Step {
    pub fn new(rule_type: RuleType, arity: u8) -> Self {
        Self {
            rule_type,
            arity,
            punct: PunctHistory::None,
        }
    }

    pub fn with_punct(mut self, punct: PunctHistory) -> Self {
        self.punct = punct;
        self
    }
}

impl NormalForm {
    /// Whether `parent` may be built over `left` and `right`.
    ///
    /// Unary steps pass their only child as `left`.
    pub fn permits(self, parent: Step, left: Option<Step>, right: Option<Step>) -> bool {
        match self {
            NormalForm::None => true,
            NormalForm::EisnerOriginal => eisner_original(parent, left, right),
            NormalForm::Eisner => eisner(parent, left, right),
            NormalForm::FullNoPunctuation => {
                eisner(parent, left, right) && full_no_punctuation(parent, left, right)
            }
            NormalForm::Full => {
                eisner(parent, left, right)
                    && full_no_punctuation(parent, left, right)
                    && punctuation(parent, left, right)
            }
        }
    }
}

/// Harmonic or crossed composition in one direction.
fn forward_composition(rule_type: RuleType) -> bool {
    matches!(rule_type, RuleType::FwCompose | RuleType::FwXCompose)
}

fn backward_composition(rule_type: RuleType) -> bool {
    matches!(rule_type, RuleType::BwCompose | RuleType::BwXCompose)
}

/// `>` or `>B^n`: degree-indexed forward combinators.
fn forward_degree(rule_type: RuleType) -> bool {
    rule_type == RuleType::FwApply || forward_composition(rule_type)
}

fn backward_degree(rule_type: RuleType) -> bool {
    rule_type == RuleType::BwApply || backward_composition(rule_type)
}

fn eisner_original(parent: Step, left: Option<Step>, right: Option<Step>) -> bool {
    let pt = parent.rule_type;
    if forward_degree(pt) && left.is_some_and(|l| forward_composition(l.rule_type)) {
        return false;
    }
    if backward_degree(pt) && right.is_some_and(|r| backward_composition(r.rule_type)) {
        return false;
    }
    true
}

fn eisner(parent: Step, left: Option<Step>, right: Option<Step>) -> bool {
    let pt = parent.rule_type;
    let m = parent.arity;

    if forward_degree(pt) {
        // >B^n output as the primary functor of >B^m, m <= n
        if let Some(l) = left {
            if forward_composition(l.rule_type) && l.arity >= 1 && m <= l.arity {
                return false;
            }
        }
        // >B^k output as the secondary argument of >B^m, m > k
        if let Some(r) = right {
            if forward_composition(r.rule_type) && r.arity >= 1 && m > r.arity {
                return false;
            }
        }
    }

    if backward_degree(pt) {
        if let Some(r) = right {
            if backward_composition(r.rule_type) && r.arity >= 1 && m <= r.arity {
                return false;
            }
        }
        if let Some(l) = left {
            if backward_composition(l.rule_type) && l.arity >= 1 && m > l.arity {
                return false;
            }
        }
    }
    true
}

fn full_no_punctuation(parent: Step, left: Option<Step>, right: Option<Step>) -> bool {
    let pt = parent.rule_type;
    let left_type = left.map(|s| s.rule_type);
    let right_type = right.map(|s| s.rule_type);

    // Raised categories only act as primary functors of composition.
    if pt == RuleType::FwApply && left_type == Some(RuleType::FwTypeRaise) {
        return false;
    }
    if pt == RuleType::BwApply && right_type == Some(RuleType::BwTypeRaise) {
        return false;
    }

    if pt.is_type_raise() && left_type == Some(RuleType::BwConjoin) {
        return false;
    }

    if (pt.is_type_raise() || pt == RuleType::TypeChange)
        && left_type.is_some_and(RuleType::is_type_raise)
    {
        return false;
    }

    // X[conj] waits for its left conjunct.
    let conjoined = |t: Option<RuleType>| t == Some(RuleType::FwConjoin);
    if (conjoined(left_type) || conjoined(right_type))
        && !(pt == RuleType::BwConjoin || pt.is_punctuation())
    {
        return false;
    }
    true
}

fn punctuation(parent: Step, left: Option<Step>, right: Option<Step>) -> bool {
    match parent.rule_type {
        RuleType::FwPunct => match right {
            Some(r) => r.punct != PunctHistory::Right && r.rule_type != RuleType::FwConjoin,
            None => true,
        },
        RuleType::BwPunct => left.map_or(true, |l| l.rule_type != RuleType::FwConjoin),
        _ => true,
    }
}
