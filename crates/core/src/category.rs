//! # Grammar Categories
//!
//! A CCG category is either an atom (`S`, `NP[nb]`, `conj`, `,`) or a
//! functor `X/Y` / `X\Y` that seeks an argument `Y` to its right (`/`) or
//! left (`\`) and yields `X`.
//!
//! Categories are immutable values with cheap clones: sub-trees are shared
//! through `Arc`, and structural equality covers symbol, feature, direction
//! and the conjunction flag. The interner in [`crate::intern`] turns a
//! category into a dense [`crate::CatId`] handle.
//!
//! ```text
//!        (S\NP)/NP          result: S\NP    argument: NP    direction: /
//!         /      \
//!      S\NP      NP         arity = 2  (two arguments along the result chain)
//!      /  \
//!     S    NP
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Symbol of the conjunction atom.
pub const CONJ: &str = "conj";

/// Symbol of the synthetic root category.
pub const TOP: &str = "TOP";

/// Feature that marks a bare (determiner-less) noun phrase.
pub const FEATURE_NB: &str = "nb";

/// Feature that marks an interrogative sentence.
pub const FEATURE_Q: &str = "q";

/// Atom symbols treated as punctuation.
pub const PUNCTUATION: &[&str] = &[
    ",", ".", ":", ";", "!", "?", "LRB", "RRB", "-LRB-", "-RRB-", "LQU", "RQU", "``", "''",
];

/// Slash direction of a functor category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// `X/Y`: argument expected on the right.
    Forward,
    /// `X\Y`: argument expected on the left.
    Backward,
}

impl Direction {
    /// The slash character for this direction.
    pub fn slash(self) -> char {
        match self {
            Direction::Forward => '/',
            Direction::Backward => '\\',
        }
    }

    /// The opposite direction.
    pub fn flip(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// The structure of a category node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    /// An atomic category such as `S[dcl]`.
    Atomic {
        symbol: String,
        feature: Option<String>,
        conj: bool,
    },
    /// A functor category `result|argument`.
    Complex {
        result: Category,
        argument: Category,
        direction: Direction,
        /// Result and argument are the same category (`X|X`).
        modifier: bool,
        conj: bool,
    },
}

/// An immutable CCG category.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Category(Arc<CategoryKind>);

impl Category {
    /// An atomic category without feature.
    pub fn atomic(symbol: &str) -> Self {
        Self::from_kind(CategoryKind::Atomic {
            symbol: symbol.to_string(),
            feature: None,
            conj: false,
        })
    }

    /// An atomic category carrying a feature, e.g. `S[dcl]`.
    pub fn atomic_with_feature(symbol: &str, feature: &str) -> Self {
        Self::from_kind(CategoryKind::Atomic {
            symbol: symbol.to_string(),
            feature: Some(feature.to_string()),
            conj: false,
        })
    }

    /// A functor category `result|argument`.
    pub fn complex(result: Category, argument: Category, direction: Direction) -> Self {
        let modifier = result.eq_ignoring_conj(&argument);
        Self::from_kind(CategoryKind::Complex {
            result,
            argument,
            direction,
            modifier,
            conj: false,
        })
    }

    fn from_kind(kind: CategoryKind) -> Self {
        Category(Arc::new(kind))
    }

    /// `self/arg`
    pub fn forward(&self, arg: &Category) -> Category {
        Category::complex(self.clone(), arg.clone(), Direction::Forward)
    }

    /// `self\arg`
    pub fn backward(&self, arg: &Category) -> Category {
        Category::complex(self.clone(), arg.clone(), Direction::Backward)
    }

    /// `S`
    pub fn s() -> Self {
        Self::atomic("S")
    }

    /// `N`
    pub fn n() -> Self {
        Self::atomic("N")
    }

    /// `NP`
    pub fn np() -> Self {
        Self::atomic("NP")
    }

    /// `conj`
    pub fn conj() -> Self {
        Self::atomic(CONJ)
    }

    /// `TOP`
    pub fn top() -> Self {
        Self::atomic(TOP)
    }

    /// The underlying node.
    pub fn kind(&self) -> &CategoryKind {
        &self.0
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self.kind(), CategoryKind::Atomic { .. })
    }

    pub fn is_complex(&self) -> bool {
        !self.is_atomic()
    }

    /// Symbol of an atomic category.
    pub fn symbol(&self) -> Option<&str> {
        match self.kind() {
            CategoryKind::Atomic { symbol, .. } => Some(symbol),
            CategoryKind::Complex { .. } => None,
        }
    }

    /// Feature of an atomic category.
    pub fn feature(&self) -> Option<&str> {
        match self.kind() {
            CategoryKind::Atomic { feature, .. } => feature.as_deref(),
            CategoryKind::Complex { .. } => None,
        }
    }

    /// Result of a functor category.
    pub fn result(&self) -> Option<&Category> {
        match self.kind() {
            CategoryKind::Complex { result, .. } => Some(result),
            CategoryKind::Atomic { .. } => None,
        }
    }

    /// Argument of a functor category.
    pub fn argument(&self) -> Option<&Category> {
        match self.kind() {
            CategoryKind::Complex { argument, .. } => Some(argument),
            CategoryKind::Atomic { .. } => None,
        }
    }

    /// Slash direction of a functor category.
    pub fn direction(&self) -> Option<Direction> {
        match self.kind() {
            CategoryKind::Complex { direction, .. } => Some(*direction),
            CategoryKind::Atomic { .. } => None,
        }
    }

    /// Result, argument and direction of a functor category.
    pub fn split(&self) -> Option<(&Category, &Category, Direction)> {
        match self.kind() {
            CategoryKind::Complex {
                result,
                argument,
                direction,
                ..
            } => Some((result, argument, *direction)),
            CategoryKind::Atomic { .. } => None,
        }
    }

    /// `X|X`: the functor returns the type of its own argument.
    pub fn is_modifier(&self) -> bool {
        match self.kind() {
            CategoryKind::Complex { modifier, .. } => *modifier,
            CategoryKind::Atomic { .. } => false,
        }
    }

    /// Conjunction-marked (`X[conj]`).
    pub fn is_conj(&self) -> bool {
        match self.kind() {
            CategoryKind::Atomic { conj, .. } | CategoryKind::Complex { conj, .. } => *conj,
        }
    }

    /// The bare conjunction atom `conj`.
    pub fn is_conjunction(&self) -> bool {
        self.symbol() == Some(CONJ)
    }

    /// A punctuation atom.
    pub fn is_punctuation(&self) -> bool {
        self.symbol().is_some_and(is_punctuation_symbol)
    }

    /// The synthetic root atom.
    pub fn is_top(&self) -> bool {
        self.symbol() == Some(TOP)
    }

    /// Number of arguments along the result chain.
    pub fn arity(&self) -> usize {
        match self.kind() {
            CategoryKind::Atomic { .. } => 0,
            CategoryKind::Complex { result, .. } => 1 + result.arity(),
        }
    }

    /// Number of atoms in the tree.
    pub fn size(&self) -> usize {
        match self.kind() {
            CategoryKind::Atomic { .. } => 1,
            CategoryKind::Complex {
                result, argument, ..
            } => result.size() + argument.size(),
        }
    }

    /// The innermost result of the result chain (`S` for `(S\NP)/NP`).
    pub fn target(&self) -> &Category {
        match self.kind() {
            CategoryKind::Atomic { .. } => self,
            CategoryKind::Complex { result, .. } => result.target(),
        }
    }

    /// A copy with the conjunction flag set or cleared.
    pub fn with_conj(&self, conj: bool) -> Category {
        if self.is_conj() == conj {
            return self.clone();
        }
        match self.kind() {
            CategoryKind::Atomic {
                symbol, feature, ..
            } => Self::from_kind(CategoryKind::Atomic {
                symbol: symbol.clone(),
                feature: feature.clone(),
                conj,
            }),
            CategoryKind::Complex {
                result,
                argument,
                direction,
                modifier,
                ..
            } => Self::from_kind(CategoryKind::Complex {
                result: result.clone(),
                argument: argument.clone(),
                direction: *direction,
                modifier: *modifier,
                conj,
            }),
        }
    }

    /// A copy with the top-level feature replaced.
    pub fn with_feature(&self, feature: Option<&str>) -> Category {
        match self.kind() {
            CategoryKind::Atomic { symbol, conj, .. } => Self::from_kind(CategoryKind::Atomic {
                symbol: symbol.clone(),
                feature: feature.map(str::to_string),
                conj: *conj,
            }),
            CategoryKind::Complex { .. } => self.clone(),
        }
    }

    /// A copy with every feature removed.
    pub fn strip_features(&self) -> Category {
        match self.kind() {
            CategoryKind::Atomic { feature: None, .. } => self.clone(),
            CategoryKind::Atomic { .. } => self.with_feature(None),
            CategoryKind::Complex {
                result,
                argument,
                direction,
                conj,
                ..
            } => Category::complex(result.strip_features(), argument.strip_features(), *direction)
                .with_conj(*conj),
        }
    }

    /// Structural equality that ignores conjunction flags.
    pub fn eq_ignoring_conj(&self, other: &Category) -> bool {
        match (self.kind(), other.kind()) {
            (
                CategoryKind::Atomic {
                    symbol: s1,
                    feature: f1,
                    ..
                },
                CategoryKind::Atomic {
                    symbol: s2,
                    feature: f2,
                    ..
                },
            ) => s1 == s2 && f1 == f2,
            (
                CategoryKind::Complex {
                    result: r1,
                    argument: a1,
                    direction: d1,
                    ..
                },
                CategoryKind::Complex {
                    result: r2,
                    argument: a2,
                    direction: d2,
                    ..
                },
            ) => d1 == d2 && r1.eq_ignoring_conj(r2) && a1.eq_ignoring_conj(a2),
            _ => false,
        }
    }

    /// Soft equality: features are ignored and `N` matches `NP`.
    pub fn soft_eq(&self, other: &Category) -> bool {
        match (self.kind(), other.kind()) {
            (
                CategoryKind::Atomic {
                    symbol: s1,
                    conj: c1,
                    ..
                },
                CategoryKind::Atomic {
                    symbol: s2,
                    conj: c2,
                    ..
                },
            ) => c1 == c2 && symbols_compatible(s1, s2),
            (
                CategoryKind::Complex {
                    result: r1,
                    argument: a1,
                    direction: d1,
                    conj: c1,
                    ..
                },
                CategoryKind::Complex {
                    result: r2,
                    argument: a2,
                    direction: d2,
                    conj: c2,
                    ..
                },
            ) => c1 == c2 && d1 == d2 && r1.soft_eq(r2) && a1.soft_eq(a2),
            _ => false,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_complex() && !self.is_conj() {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// Whether a symbol names a punctuation atom.
pub fn is_punctuation_symbol(symbol: &str) -> bool {
    PUNCTUATION.contains(&symbol)
}

/// Atom symbols are compatible when equal, or when both are nominal (`N`, `NP`).
pub fn symbols_compatible(a: &str, b: &str) -> bool {
    a == b || (is_nominal(a) && is_nominal(b))
}

fn is_nominal(symbol: &str) -> bool {
    symbol == "N" || symbol == "NP"
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            CategoryKind::Atomic {
                symbol,
                feature,
                conj,
            } => {
                write!(f, "{}", symbol)?;
                if let Some(feature) = feature {
                    write!(f, "[{}]", feature)?;
                }
                if *conj {
                    write!(f, "[{}]", CONJ)?;
                }
                Ok(())
            }
            CategoryKind::Complex {
                result,
                argument,
                direction,
                conj,
                ..
            } => {
                if *conj {
                    write!(f, "(")?;
                }
                result.fmt_operand(f)?;
                write!(f, "{}", direction.slash())?;
                argument.fmt_operand(f)?;
                if *conj {
                    write!(f, ")[{}]", CONJ)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Category({})", self)
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tv() -> Category {
        Category::s().backward(&Category::np()).forward(&Category::np())
    }

    #[test]
    fn test_display() {
        assert_eq!(tv().to_string(), "(S\\NP)/NP");
        assert_eq!(Category::atomic_with_feature("S", "dcl").to_string(), "S[dcl]");
        assert_eq!(Category::np().with_conj(true).to_string(), "NP[conj]");

        let vp = Category::s().backward(&Category::np());
        assert_eq!(vp.with_conj(true).to_string(), "(S\\NP)[conj]");
        assert_eq!(vp.backward(&vp).to_string(), "(S\\NP)\\(S\\NP)");
    }

    #[test]
    fn test_arity() {
        assert_eq!(Category::s().arity(), 0);
        assert_eq!(tv().arity(), 2);
        let adv = Category::s().backward(&Category::np());
        assert_eq!(adv.backward(&adv).arity(), 1);
    }

    #[test]
    fn test_modifier_flag() {
        let n = Category::n();
        assert!(n.forward(&n).is_modifier());
        assert!(!tv().is_modifier());
        // Conjunction marking on the argument does not change the shape.
        assert!(n.forward(&n.with_conj(true)).is_modifier());
        // Features do.
        let s_dcl = Category::atomic_with_feature("S", "dcl");
        assert!(!s_dcl.backward(&Category::s()).is_modifier());
    }

    #[test]
    fn test_equality_includes_feature_and_conj() {
        let np = Category::np();
        assert_ne!(np, Category::atomic_with_feature("NP", "nb"));
        assert_ne!(np, np.with_conj(true));
        assert_eq!(np, Category::atomic("NP"));
    }

    #[test]
    fn test_soft_equality() {
        let np = Category::np();
        let n = Category::n();
        assert!(np.soft_eq(&n));
        assert!(Category::atomic_with_feature("NP", "nb").soft_eq(&n));
        assert!(n.forward(&n).soft_eq(&np.forward(&n)));
        assert!(!np.soft_eq(&Category::s()));
        assert!(!np.soft_eq(&np.with_conj(true)));
    }

    #[test]
    fn test_strip_features() {
        let s_dcl = Category::atomic_with_feature("S", "dcl");
        let vp = s_dcl.backward(&Category::np());
        assert_eq!(vp.strip_features().to_string(), "S\\NP");
    }

    #[test]
    fn test_target_and_accessors() {
        let cat = tv();
        assert_eq!(cat.target(), &Category::s());
        assert_eq!(cat.direction(), Some(Direction::Forward));
        assert_eq!(cat.argument(), Some(&Category::np()));
        assert_eq!(cat.result().map(|r| r.to_string()), Some("S\\NP".to_string()));
        assert!(Category::atomic(",").is_punctuation());
        assert!(Category::conj().is_conjunction());
        assert!(Category::top().is_top());
    }

    #[test]
    fn test_serde_as_string() {
        let cat = tv();
        let json = serde_json::to_string(&cat).unwrap();
        assert_eq!(json, "\"(S\\\\NP)/NP\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cat);
    }
}
