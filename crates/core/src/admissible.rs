//! Admissibility of induced categories.
//!
//! Induction proposes new functor categories from data. Before a proposal
//! reaches the lexicon it must pass [`ArityLimits::rejection`]: arguments
//! may not be modifiers or conjunctions, categories stay within the
//! configured arities, and atomic results take only atomic arguments
//! unless complex arguments are enabled.

use crate::category::Category;
use crate::error::CategoryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bounds on the shape of induced categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArityLimits {
    /// Maximum number of arguments of a non-modifier category.
    pub max_arity: usize,
    /// Maximum arity of the category a modifier `X|X` modifies.
    pub max_modifier_arity: usize,
    /// Allow `X|(Y|Z)` with atomic `X`.
    pub complex_arguments: bool,
}

impl Default for ArityLimits {
    fn default() -> Self {
        Self {
            max_arity: 3,
            max_modifier_arity: 2,
            complex_arguments: false,
        }
    }
}

/// Why a proposal was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    ModifierArgument,
    ConjunctionArgument,
    ArityExceeded,
    ModifierArityExceeded,
    ComplexArgument,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::ModifierArgument => "argument is a modifier",
            Rejection::ConjunctionArgument => "argument is a conjunction",
            Rejection::ArityExceeded => "arity exceeded",
            Rejection::ModifierArityExceeded => "modifier arity exceeded",
            Rejection::ComplexArgument => "atomic result with complex argument",
        };
        f.write_str(text)
    }
}

impl ArityLimits {
    pub fn from_json_str(json: &str) -> Result<Self, CategoryError> {
        serde_json::from_str(json).map_err(|e| CategoryError::InvalidConfig {
            reason: e.to_string(),
        })
    }

    /// The first reason `proposal` is inadmissible, if any.
    pub fn rejection(&self, proposal: &Category) -> Option<Rejection> {
        let (result, _, _) = proposal.split()?;

        let mut current = proposal;
        while let Some((inner, argument, _)) = current.split() {
            if argument.is_modifier() {
                return Some(Rejection::ModifierArgument);
            }
            if argument.is_conj() || argument.is_conjunction() || argument.is_punctuation() {
                return Some(Rejection::ConjunctionArgument);
            }
            current = inner;
        }

        if proposal.is_modifier() {
            if result.arity() > self.max_modifier_arity {
                return Some(Rejection::ModifierArityExceeded);
            }
        } else if proposal.arity() > self.max_arity {
            return Some(Rejection::ArityExceeded);
        }

        if !self.complex_arguments
            && result.is_atomic()
            && proposal.argument().is_some_and(Category::is_complex)
        {
            return Some(Rejection::ComplexArgument);
        }
        None
    }

    pub fn admits(&self, proposal: &Category) -> bool {
        self.rejection(proposal).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(text: &str) -> Category {
        text.parse().unwrap()
    }

    #[test]
    fn test_atoms_always_admissible() {
        let limits = ArityLimits::default();
        assert!(limits.admits(&cat("N")));
        assert!(limits.admits(&cat("conj")));
    }

    #[test]
    fn test_common_categories() {
        let limits = ArityLimits::default();
        assert!(limits.admits(&cat("N/N")));
        assert!(limits.admits(&cat("(S\\NP)/NP")));
        assert!(limits.admits(&cat("(S\\NP)\\(S\\NP)")));
    }

    #[test]
    fn test_rejections() {
        let limits = ArityLimits::default();
        assert_eq!(
            limits.rejection(&cat("N/(N/N)")),
            Some(Rejection::ModifierArgument)
        );
        assert_eq!(
            limits.rejection(&cat("N/conj")),
            Some(Rejection::ConjunctionArgument)
        );
        assert_eq!(
            limits.rejection(&cat("N/NP[conj]")),
            Some(Rejection::ConjunctionArgument)
        );
        assert_eq!(
            limits.rejection(&cat("(((S\\NP)/NP)/NP)/NP")),
            Some(Rejection::ArityExceeded)
        );
        assert_eq!(
            limits.rejection(&cat("(((S\\NP)/NP)/NP)\\(((S\\NP)/NP)/NP)")),
            Some(Rejection::ModifierArityExceeded)
        );
        assert_eq!(
            limits.rejection(&cat("S/(S\\NP)")),
            Some(Rejection::ComplexArgument)
        );
    }

    #[test]
    fn test_complex_arguments_toggle() {
        let limits = ArityLimits {
            complex_arguments: true,
            ..ArityLimits::default()
        };
        assert!(limits.admits(&cat("S/(S\\NP)")));
    }
}
