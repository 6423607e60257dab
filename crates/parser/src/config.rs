//! Parser configuration.

use crate::error::ParseError;
use crate::normal_form::NormalForm;
use ccg_core::{Category, CombinatorConfig};
use serde::{Deserialize, Serialize};

/// How the grammar store treats a category pair it has never seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoveryMode {
    /// Resolve unseen pairs through the combinators and remember the result.
    #[default]
    Open,
    /// Only rules already in the tables apply.
    Closed,
}

/// A type-raising rule `from → T|(T|from)` installed eagerly for every
/// interned `from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRaiseTarget {
    pub from: Category,
    pub to: Category,
}

/// Everything the engine reads while charting a sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub combinators: CombinatorConfig,
    pub normal_form: NormalForm,
    /// Keep punctuation tokens in the chart.
    pub punctuation: bool,
    /// Derivations extracted per chart.
    pub top_k: usize,
    /// Consult [`crate::Scorer::is_rule_required`] before using a rule.
    pub test_time: bool,
    pub discovery: DiscoveryMode,
    pub type_raise_targets: Vec<TypeRaiseTarget>,
    /// Unary closure passes after each span.
    pub unary_passes: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            combinators: CombinatorConfig::default(),
            normal_form: NormalForm::Eisner,
            punctuation: true,
            top_k: 10,
            test_time: false,
            discovery: DiscoveryMode::Open,
            type_raise_targets: vec![
                TypeRaiseTarget {
                    from: Category::np(),
                    to: Category::s(),
                },
                TypeRaiseTarget {
                    from: Category::n(),
                    to: Category::s(),
                },
            ],
            unary_passes: 2,
        }
    }
}

impl ParserConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ParseError> {
        let config: ParserConfig =
            serde_json::from_str(json).map_err(|e| ParseError::InvalidConfig {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ParseError> {
        self.combinators.validate()?;
        if self.top_k == 0 {
            return Err(ParseError::InvalidConfig {
                reason: "top_k must be at least 1".into(),
            });
        }
        for target in &self.type_raise_targets {
            if !target.to.is_atomic() {
                return Err(ParseError::InvalidConfig {
                    reason: format!("type-raise target {} is not atomic", target.to),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ParserConfig::from_json_str(r#"{"top_k": 3, "normal_form": "Full"}"#).unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.normal_form, NormalForm::Full);
        assert!(config.punctuation);
        assert_eq!(config.type_raise_targets.len(), 2);
    }

    #[test]
    fn test_rejects_complex_raise_target() {
        let json = r#"{"type_raise_targets": [{"from": "NP", "to": "S\\NP"}]}"#;
        assert!(matches!(
            ParserConfig::from_json_str(json),
            Err(ParseError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_k() {
        assert!(ParserConfig::from_json_str(r#"{"top_k": 0}"#).is_err());
    }
}
