//! Combinatory power configuration.

use crate::error::CategoryError;
use serde::{Deserialize, Serialize};

/// Highest supported composition degree (`B^5`).
pub const MAX_COMPOSITION_DEGREE: u8 = 5;

/// Where the conjunction's dependency arcs attach in a coordination.
///
/// Arcs read `head → dependent` with the slot number in parentheses;
/// `cc` is the conjunction, `X1`/`X2` the first and second conjunct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinationStyle {
    /// `cc→X1 (1)`, `cc→X2 (2)`
    #[default]
    ConjunctionHeads,
    /// `X1→cc (1)`, `X1→X2 (2)`
    FirstConjunctHeads,
    /// `X1→cc (1)`, `cc→X2 (2)`
    Chain,
    /// `X2→cc (1)`, `X2→X1 (2)`
    SecondConjunctHeads,
    /// `X1→X2 (1)`, `X2→cc (2)`
    ConjunctChain,
}

impl CoordinationStyle {
    pub const ALL: [CoordinationStyle; 5] = [
        CoordinationStyle::ConjunctionHeads,
        CoordinationStyle::FirstConjunctHeads,
        CoordinationStyle::Chain,
        CoordinationStyle::SecondConjunctHeads,
        CoordinationStyle::ConjunctChain,
    ];
}

/// Which combinators the grammar may use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinatorConfig {
    /// Maximum composition degree; 0 means application only.
    pub composition_degree: u8,
    /// Allow crossed composition (`>Bx`, `<Bx`).
    pub crossed_composition: bool,
    /// Only modifier categories (`X|X`) may be the primary functor of
    /// composition.
    pub modifier_primary_only: bool,
    /// Allow substitution (`>S`, `<Sx`).
    pub substitution: bool,
    /// Allow unary type-raising.
    pub type_raising: bool,
    /// Coordination dependency convention.
    pub coordination: CoordinationStyle,
}

impl CombinatorConfig {
    /// Application only.
    pub fn application_only() -> Self {
        Self {
            composition_degree: 0,
            crossed_composition: false,
            modifier_primary_only: false,
            substitution: false,
            type_raising: false,
            coordination: CoordinationStyle::default(),
        }
    }

    /// Application plus composition up to `degree`.
    pub fn with_composition(degree: u8) -> Self {
        Self {
            composition_degree: degree,
            ..Self::application_only()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CategoryError> {
        let config: Self = serde_json::from_str(json).map_err(|e| CategoryError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CategoryError> {
        if self.composition_degree > MAX_COMPOSITION_DEGREE {
            return Err(CategoryError::InvalidConfig {
                reason: format!(
                    "composition degree {} exceeds {}",
                    self.composition_degree, MAX_COMPOSITION_DEGREE
                ),
            });
        }
        Ok(())
    }
}

impl Default for CombinatorConfig {
    fn default() -> Self {
        Self {
            composition_degree: 1,
            crossed_composition: true,
            modifier_primary_only: false,
            substitution: false,
            type_raising: false,
            coordination: CoordinationStyle::default(),
        }
    }
}
