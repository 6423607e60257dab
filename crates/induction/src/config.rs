//! Trainer configuration.

use crate::error::InductionError;
use crate::seed::SeedTags;
use ccg_core::ArityLimits;
use ccg_parser::ParserConfig;
use serde::{Deserialize, Serialize};

/// Everything the EM trainer reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Worker threads parsing sentences.
    pub threads: usize,
    /// Stop once the relative change in corpus log-likelihood drops below this.
    pub convergence: f64,
    pub max_iterations: usize,
    /// Leading iterations that also propose new lexical categories.
    pub induction_rounds: usize,
    /// Dirichlet concentration of the rule model.
    pub alpha: f64,
    pub limits: ArityLimits,
    pub seed: SeedTags,
    pub parser: ParserConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            convergence: 1e-4,
            max_iterations: 20,
            induction_rounds: 2,
            alpha: 1.0,
            limits: ArityLimits::default(),
            seed: SeedTags::default(),
            parser: ParserConfig::default(),
        }
    }
}

impl TrainerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, InductionError> {
        let config: TrainerConfig =
            serde_json::from_str(json).map_err(|e| InductionError::InvalidConfig {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_induction_rounds(mut self, rounds: usize) -> Self {
        self.induction_rounds = rounds;
        self
    }

    pub fn validate(&self) -> Result<(), InductionError> {
        let invalid = |reason: &str| {
            Err(InductionError::InvalidConfig {
                reason: reason.to_string(),
            })
        };
        if self.threads == 0 {
            return invalid("threads must be positive");
        }
        if !(self.convergence > 0.0 && self.convergence.is_finite()) {
            return invalid("convergence threshold must be positive");
        }
        if !(self.alpha > 0.0 && self.alpha.is_finite()) {
            return invalid("alpha must be positive");
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations must be positive");
        }
        self.parser.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(TrainerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            TrainerConfig::from_json_str(r#"{"threads": 2, "limits": {"max_arity": 2}}"#).unwrap();
        assert_eq!(config.threads, 2);
        assert_eq!(config.limits.max_arity, 2);
        assert_eq!(config.limits.max_modifier_arity, 2);
        assert_eq!(config.induction_rounds, 2);
        assert_eq!(config.seed, SeedTags::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        for json in [
            r#"{"threads": 0}"#,
            r#"{"alpha": 0.0}"#,
            r#"{"convergence": -1.0}"#,
            r#"{"max_iterations": 0}"#,
            r#"{"parser": {"top_k": 0}}"#,
            r#"{"threads": "four"}"#,
        ] {
            assert!(TrainerConfig::from_json_str(json).is_err(), "{json}");
        }
    }

    #[test]
    fn test_builders() {
        let config = TrainerConfig::default()
            .with_threads(1)
            .with_max_iterations(3)
            .with_induction_rounds(0);
        assert_eq!(
            (config.threads, config.max_iterations, config.induction_rounds),
            (1, 3, 0)
        );
    }
}
