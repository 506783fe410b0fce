//! Balance configuration for a Carbon Chase session.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    EXCELLENT_RATIO_CUTOFF, FIRST_FINE_PCT, GOOD_RATIO_CUTOFF, HIGH_BUDGET, LOW_BUDGET,
    MEDIUM_BUDGET, MIN_HAPPINESS_PCT, SECOND_FINE_PCT,
};
use crate::thresholds::ThresholdPolicy;

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("configuration could not be parsed: {0}")]
    Parse(String),
    #[error("{field} must be positive (got {value:.2})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("warning ratio {warning:.2} must be below severe ratio {severe:.2}, both in (0, 1]")]
    EmissionRatios { warning: f64, severe: f64 },
    #[error("{field} must be between 0 and 100 (got {value:.2})")]
    PercentRange { field: &'static str, value: f64 },
    #[error("success cut-offs invalid: excellent {excellent:.2} must be below good {good:.2}")]
    TierCutoffs { excellent: f64, good: f64 },
    #[error("at least one budget tier is required")]
    NoBudgetTiers,
    #[error("budget tier '{label}' must have a positive budget (got {budget})")]
    TierBudget { label: String, budget: i64 },
}

/// A named starting budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetTier {
    pub label: String,
    pub budget: i64,
}

impl BudgetTier {
    #[must_use]
    pub fn new(label: impl Into<String>, budget: i64) -> Self {
        Self {
            label: label.into(),
            budget,
        }
    }
}

/// Fine percentages charged when the warning stage advances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinePolicy {
    #[serde(default = "FinePolicy::default_first_pct")]
    pub first_pct: f64,
    #[serde(default = "FinePolicy::default_second_pct")]
    pub second_pct: f64,
}

impl FinePolicy {
    const fn default_first_pct() -> f64 {
        FIRST_FINE_PCT
    }

    const fn default_second_pct() -> f64 {
        SECOND_FINE_PCT
    }
}

impl Default for FinePolicy {
    fn default() -> Self {
        Self {
            first_pct: Self::default_first_pct(),
            second_pct: Self::default_second_pct(),
        }
    }
}

/// End-of-session rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminationPolicy {
    #[serde(default = "TerminationPolicy::default_min_happiness_pct")]
    pub min_happiness_pct: u8,
    #[serde(default = "TerminationPolicy::default_excellent_ratio")]
    pub excellent_ratio: f64,
    #[serde(default = "TerminationPolicy::default_good_ratio")]
    pub good_ratio: f64,
}

impl TerminationPolicy {
    const fn default_min_happiness_pct() -> u8 {
        MIN_HAPPINESS_PCT
    }

    const fn default_excellent_ratio() -> f64 {
        EXCELLENT_RATIO_CUTOFF
    }

    const fn default_good_ratio() -> f64 {
        GOOD_RATIO_CUTOFF
    }
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self {
            min_happiness_pct: Self::default_min_happiness_pct(),
            excellent_ratio: Self::default_excellent_ratio(),
            good_ratio: Self::default_good_ratio(),
        }
    }
}

/// Complete balance table for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub thresholds: ThresholdPolicy,
    #[serde(default)]
    pub fines: FinePolicy,
    #[serde(default)]
    pub termination: TerminationPolicy,
    #[serde(default = "GameConfig::default_budget_tiers")]
    pub budget_tiers: Vec<BudgetTier>,
}

impl GameConfig {
    fn default_budget_tiers() -> Vec<BudgetTier> {
        vec![
            BudgetTier::new("Low Budget", LOW_BUDGET),
            BudgetTier::new("Medium Budget", MEDIUM_BUDGET),
            BudgetTier::new("High Budget", HIGH_BUDGET),
        ]
    }

    /// Parse a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the resulting
    /// configuration fails [`GameConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the balance invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let policy = &self.thresholds;
        for (field, value) in [
            ("base_threshold", policy.base_threshold),
            ("reference_budget", policy.reference_budget),
            ("scale_factor", policy.scale_factor),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        let ratios_ok = policy.warning_ratio > 0.0
            && policy.warning_ratio < policy.severe_ratio
            && policy.severe_ratio <= 1.0;
        if !ratios_ok {
            return Err(ConfigError::EmissionRatios {
                warning: policy.warning_ratio,
                severe: policy.severe_ratio,
            });
        }
        for (field, value) in [
            ("fines.first_pct", self.fines.first_pct),
            ("fines.second_pct", self.fines.second_pct),
            (
                "termination.min_happiness_pct",
                f64::from(self.termination.min_happiness_pct),
            ),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::PercentRange { field, value });
            }
        }
        let term = &self.termination;
        if !(term.excellent_ratio > 0.0 && term.excellent_ratio < term.good_ratio) {
            return Err(ConfigError::TierCutoffs {
                excellent: term.excellent_ratio,
                good: term.good_ratio,
            });
        }
        if self.budget_tiers.is_empty() {
            return Err(ConfigError::NoBudgetTiers);
        }
        if let Some(tier) = self.budget_tiers.iter().find(|tier| tier.budget <= 0) {
            return Err(ConfigError::TierBudget {
                label: tier.label.clone(),
                budget: tier.budget,
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdPolicy::default(),
            fines: FinePolicy::default(),
            termination: TerminationPolicy::default(),
            budget_tiers: Self::default_budget_tiers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.termination.min_happiness_pct, 40);
        let budgets: Vec<_> = cfg.budget_tiers.iter().map(|t| t.budget).collect();
        assert_eq!(budgets, [5_000, 10_000, 20_000]);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = GameConfig::from_json(r#"{ "termination": { "min_happiness_pct": 50 } }"#)
            .unwrap();
        assert_eq!(cfg.termination.min_happiness_pct, 50);
        assert!((cfg.termination.good_ratio - 0.7).abs() < f64::EPSILON);
        assert_eq!(cfg.thresholds, ThresholdPolicy::default());
        assert_eq!(cfg.budget_tiers.len(), 3);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut cfg = GameConfig::default();
        cfg.thresholds.warning_ratio = 0.8;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::EmissionRatios { .. })
        ));

        let mut cfg = GameConfig::default();
        cfg.fines.second_pct = 120.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::PercentRange {
                field: "fines.second_pct",
                ..
            })
        ));

        let mut cfg = GameConfig::default();
        cfg.budget_tiers.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::NoBudgetTiers));

        let mut cfg = GameConfig::default();
        cfg.thresholds.reference_budget = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NotPositive {
                field: "reference_budget",
                ..
            })
        ));

        assert!(matches!(
            GameConfig::from_json(r#"{ "budget_tiers": [ { "label": "Broke", "budget": 0 } ] }"#),
            Err(ConfigError::TierBudget { .. })
        ));
        assert!(matches!(
            GameConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }
}
