//! Rule types and grammar rules.
//!
//! Every way a chart item can be built is one variant of [`RuleType`].
//! Grammar rules record the interned categories involved, so two rules are
//! the same rule exactly when parent, children, type and arity agree.

use crate::intern::{CatId, SymbolId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of derivation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleType {
    /// Lexical category assignment.
    Lex,
    /// `X/Y Y → X`
    FwApply,
    /// `Y X\Y → X`
    BwApply,
    /// `X/Y Y/Z → X/Z` (generalised to `B^n`)
    FwCompose,
    /// `Y\Z X\Y → X\Z`
    BwCompose,
    /// `X/Y Y\Z → X\Z`
    FwXCompose,
    /// `Y/Z X\Y → X/Z`
    BwXCompose,
    /// `(X/Y)/Z Y/Z → X/Z`
    FwSubstitute,
    /// `Y/Z (X\Y)/Z → X/Z`
    BwXSubstitute,
    /// `conj X → X[conj]`
    FwConjoin,
    /// `X X[conj] → X`
    BwConjoin,
    /// `p X → X`
    FwPunct,
    /// `X p → X`
    BwPunct,
    /// `X → T/(T\X)`
    FwTypeRaise,
    /// `X → T\(T/X)`
    BwTypeRaise,
    /// `X → Y` licensed by the grammar.
    TypeChange,
    /// `X → TOP`
    Top,
}

impl RuleType {
    pub const ALL: [RuleType; 17] = [
        RuleType::Lex,
        RuleType::FwApply,
        RuleType::BwApply,
        RuleType::FwCompose,
        RuleType::BwCompose,
        RuleType::FwXCompose,
        RuleType::BwXCompose,
        RuleType::FwSubstitute,
        RuleType::BwXSubstitute,
        RuleType::FwConjoin,
        RuleType::BwConjoin,
        RuleType::FwPunct,
        RuleType::BwPunct,
        RuleType::FwTypeRaise,
        RuleType::BwTypeRaise,
        RuleType::TypeChange,
        RuleType::Top,
    ];

    pub fn is_binary(self) -> bool {
        !matches!(
            self,
            RuleType::Lex
                | RuleType::FwTypeRaise
                | RuleType::BwTypeRaise
                | RuleType::TypeChange
                | RuleType::Top
        )
    }

    pub fn is_unary(self) -> bool {
        matches!(
            self,
            RuleType::FwTypeRaise | RuleType::BwTypeRaise | RuleType::TypeChange | RuleType::Top
        )
    }

    pub fn is_application(self) -> bool {
        matches!(self, RuleType::FwApply | RuleType::BwApply)
    }

    /// Harmonic or crossed composition.
    pub fn is_composition(self) -> bool {
        matches!(
            self,
            RuleType::FwCompose | RuleType::BwCompose | RuleType::FwXCompose | RuleType::BwXCompose
        )
    }

    pub fn is_substitution(self) -> bool {
        matches!(self, RuleType::FwSubstitute | RuleType::BwXSubstitute)
    }

    pub fn is_type_raise(self) -> bool {
        matches!(self, RuleType::FwTypeRaise | RuleType::BwTypeRaise)
    }

    pub fn is_punctuation(self) -> bool {
        matches!(self, RuleType::FwPunct | RuleType::BwPunct)
    }

    pub fn is_conjoin(self) -> bool {
        matches!(self, RuleType::FwConjoin | RuleType::BwConjoin)
    }

    /// The primary functor is the left child.
    ///
    /// For unary rules this is the direction of the built slash.
    pub fn is_forward(self) -> bool {
        matches!(
            self,
            RuleType::FwApply
                | RuleType::FwCompose
                | RuleType::FwXCompose
                | RuleType::FwSubstitute
                | RuleType::FwConjoin
                | RuleType::FwPunct
                | RuleType::FwTypeRaise
        )
    }

    pub fn is_backward(self) -> bool {
        matches!(
            self,
            RuleType::BwApply
                | RuleType::BwCompose
                | RuleType::BwXCompose
                | RuleType::BwXSubstitute
                | RuleType::BwConjoin
                | RuleType::BwPunct
                | RuleType::BwTypeRaise
        )
    }

    /// Short derivation label, as printed in derivation trees.
    pub fn label(self) -> &'static str {
        match self {
            RuleType::Lex => "lex",
            RuleType::FwApply => ">",
            RuleType::BwApply => "<",
            RuleType::FwCompose => ">B",
            RuleType::BwCompose => "<B",
            RuleType::FwXCompose => ">Bx",
            RuleType::BwXCompose => "<Bx",
            RuleType::FwSubstitute => ">S",
            RuleType::BwXSubstitute => "<Sx",
            RuleType::FwConjoin => ">Φ",
            RuleType::BwConjoin => "<Φ",
            RuleType::FwPunct => ">P",
            RuleType::BwPunct => "<P",
            RuleType::FwTypeRaise => ">T",
            RuleType::BwTypeRaise => "<T",
            RuleType::TypeChange => "TC",
            RuleType::Top => "TOP",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which child supplies the parent's head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadDirection {
    Left,
    Right,
}

/// A grammar rule over interned categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    /// A lexical entry: category emitted for a part-of-speech tag.
    Lexical { parent: CatId, tag: SymbolId },
    /// A single-child rule (type-raise, type-change, top).
    Unary {
        parent: CatId,
        child: CatId,
        rule_type: RuleType,
    },
    /// A two-child combinator instance.
    Binary {
        parent: CatId,
        left: CatId,
        right: CatId,
        rule_type: RuleType,
        arity: u8,
        head: HeadDirection,
    },
}

impl Rule {
    pub fn parent(&self) -> CatId {
        match *self {
            Rule::Lexical { parent, .. } | Rule::Unary { parent, .. } | Rule::Binary { parent, .. } => {
                parent
            }
        }
    }

    pub fn rule_type(&self) -> RuleType {
        match *self {
            Rule::Lexical { .. } => RuleType::Lex,
            Rule::Unary { rule_type, .. } | Rule::Binary { rule_type, .. } => rule_type,
        }
    }

    /// Composition degree; zero for everything but composition.
    pub fn arity(&self) -> u8 {
        match *self {
            Rule::Binary { arity, .. } => arity,
            _ => 0,
        }
    }

    pub fn head(&self) -> HeadDirection {
        match *self {
            Rule::Binary { head, .. } => head,
            _ => HeadDirection::Left,
        }
    }

    /// Child categories, left first.
    pub fn children(&self) -> (Option<CatId>, Option<CatId>) {
        match *self {
            Rule::Lexical { .. } => (None, None),
            Rule::Unary { child, .. } => (Some(child), None),
            Rule::Binary { left, right, .. } => (Some(left), Some(right)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_type_partition() {
        for rt in RuleType::ALL {
            let binary = rt.is_binary();
            let unary = rt.is_unary();
            assert!(!(binary && unary), "{rt} is both");
            if rt != RuleType::Lex {
                assert!(binary || unary, "{rt} is neither");
            }
            assert!(!(rt.is_forward() && rt.is_backward()));
        }
    }

    #[test]
    fn test_rule_identity() {
        let a = Rule::Binary {
            parent: CatId(0),
            left: CatId(1),
            right: CatId(2),
            rule_type: RuleType::FwCompose,
            arity: 1,
            head: HeadDirection::Left,
        };
        let b = Rule::Binary {
            parent: CatId(0),
            left: CatId(1),
            right: CatId(2),
            rule_type: RuleType::FwCompose,
            arity: 2,
            head: HeadDirection::Left,
        };
        assert_eq!(a.rule_type(), RuleType::FwCompose);
        assert_eq!(a.children(), (Some(CatId(1)), Some(CatId(2))));
        // Arity is part of a rule's identity.
        assert_ne!(a, b);

        let lex = Rule::Lexical {
            parent: CatId(3),
            tag: SymbolId(0),
        };
        assert_eq!(lex.rule_type(), RuleType::Lex);
        assert_eq!(lex.children(), (None, None));
        assert_eq!(lex.arity(), 0);
    }
}
