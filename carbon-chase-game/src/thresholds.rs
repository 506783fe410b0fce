//! Emission limits derived from a session's starting budget.
use serde::{Deserialize, Serialize};

use crate::constants::{
    BASE_EMISSION_THRESHOLD, EMISSION_SCALE_FACTOR, REFERENCE_BUDGET, SEVERE_EMISSION_RATIO,
    WARNING_EMISSION_RATIO,
};
use crate::numbers::{ceil_snapped_f64_to_i64, i64_to_f64};

/// Scaling rule turning a budget into emission limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    #[serde(default = "ThresholdPolicy::default_base_threshold")]
    pub base_threshold: f64,
    #[serde(default = "ThresholdPolicy::default_reference_budget")]
    pub reference_budget: f64,
    #[serde(default = "ThresholdPolicy::default_scale_factor")]
    pub scale_factor: f64,
    #[serde(default = "ThresholdPolicy::default_severe_ratio")]
    pub severe_ratio: f64,
    #[serde(default = "ThresholdPolicy::default_warning_ratio")]
    pub warning_ratio: f64,
}

impl ThresholdPolicy {
    const fn default_base_threshold() -> f64 {
        BASE_EMISSION_THRESHOLD
    }

    const fn default_reference_budget() -> f64 {
        REFERENCE_BUDGET
    }

    const fn default_scale_factor() -> f64 {
        EMISSION_SCALE_FACTOR
    }

    const fn default_severe_ratio() -> f64 {
        SEVERE_EMISSION_RATIO
    }

    const fn default_warning_ratio() -> f64 {
        WARNING_EMISSION_RATIO
    }

    /// Derive thresholds for a starting budget.
    ///
    /// Called once per session; spending and fines later in the session never
    /// move the limits. Limits that are whole numbers in decimal stay whole
    /// despite the binary representation of the ratios.
    #[must_use]
    pub fn compute(&self, budget: i64) -> Thresholds {
        let scaled = self.base_threshold * (i64_to_f64(budget) / self.reference_budget);
        let max_emission = ceil_snapped_f64_to_i64(scaled * self.scale_factor);
        let max = i64_to_f64(max_emission);
        Thresholds {
            max_emission,
            severe_emission: ceil_snapped_f64_to_i64(self.severe_ratio * max),
            warning_emission: ceil_snapped_f64_to_i64(self.warning_ratio * max),
        }
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            base_threshold: Self::default_base_threshold(),
            reference_budget: Self::default_reference_budget(),
            scale_factor: Self::default_scale_factor(),
            severe_ratio: Self::default_severe_ratio(),
            warning_ratio: Self::default_warning_ratio(),
        }
    }
}

/// Emission limits fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub max_emission: i64,
    pub severe_emission: i64,
    pub warning_emission: i64,
}

impl Thresholds {
    /// Cumulative emissions as a fraction of the hard limit.
    #[must_use]
    pub fn emission_ratio(&self, emissions: i64) -> f64 {
        if self.max_emission <= 0 {
            return if emissions <= 0 { 0.0 } else { f64::INFINITY };
        }
        i64_to_f64(emissions) / i64_to_f64(self.max_emission)
    }

    /// Dashboard colouring bucket for the current emissions.
    #[must_use]
    pub const fn level(&self, emissions: i64) -> EmissionLevel {
        if emissions > self.severe_emission {
            EmissionLevel::Danger
        } else if emissions > self.warning_emission {
            EmissionLevel::Warning
        } else {
            EmissionLevel::Normal
        }
    }
}

/// Display bucket for emissions relative to the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionLevel {
    Normal,
    Warning,
    Danger,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_budget_yields_reference_limits() {
        let thresholds = ThresholdPolicy::default().compute(10_000);
        assert_eq!(thresholds.max_emission, 6_000);
        assert_eq!(thresholds.severe_emission, 4_200);
        assert_eq!(thresholds.warning_emission, 3_000);
    }

    #[test]
    fn limits_scale_with_budget_tier() {
        let policy = ThresholdPolicy::default();
        let low = policy.compute(5_000);
        assert_eq!(
            (low.max_emission, low.severe_emission, low.warning_emission),
            (3_000, 2_100, 1_500)
        );
        let high = policy.compute(20_000);
        assert_eq!(
            (high.max_emission, high.severe_emission, high.warning_emission),
            (12_000, 8_400, 6_000)
        );
    }

    #[test]
    fn fractional_limits_round_up() {
        let thresholds = ThresholdPolicy::default().compute(1_001);
        // 5000 * 0.1001 * 1.2 = 600.6
        assert_eq!(thresholds.max_emission, 601);
        assert_eq!(thresholds.severe_emission, 421);
        assert_eq!(thresholds.warning_emission, 301);
    }

    #[test]
    fn default_limits_match_exact_integer_math() {
        let policy = ThresholdPolicy::default();
        for budget in 0..=200_000_i64 {
            // max = ceil(5000 * budget / 10000 * 6 / 5) = ceil(3 * budget / 5)
            let max = (3 * budget + 4) / 5;
            let expected = Thresholds {
                max_emission: max,
                severe_emission: (7 * max + 9) / 10,
                warning_emission: (max + 1) / 2,
            };
            assert_eq!(policy.compute(budget), expected, "budget {budget}");
        }
    }

    #[test]
    fn small_budgets_do_not_round_up_twice() {
        let thresholds = ThresholdPolicy::default().compute(350);
        assert_eq!(thresholds.max_emission, 210);
        assert_eq!(thresholds.severe_emission, 147);
        assert_eq!(thresholds.warning_emission, 105);
        assert_eq!(ThresholdPolicy::default().compute(175).max_emission, 105);
    }

    #[test]
    fn ratio_and_level_follow_limits() {
        let thresholds = ThresholdPolicy::default().compute(10_000);
        assert!((thresholds.emission_ratio(1_500) - 0.25).abs() < f64::EPSILON);
        assert_eq!(thresholds.level(3_000), EmissionLevel::Normal);
        assert_eq!(thresholds.level(3_001), EmissionLevel::Warning);
        assert_eq!(thresholds.level(4_201), EmissionLevel::Danger);

        let zero = ThresholdPolicy::default().compute(0);
        assert!(zero.emission_ratio(0).abs() < f64::EPSILON);
        assert!(zero.emission_ratio(1).is_infinite());
    }
}
