//! Emission warning escalation: warn, fine, fine harder, halt.
//!
//! The stage only ever moves forward. Crossing the severe threshold jumps
//! straight to [`WarningStage::Halted`], skipping any fines not yet charged.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::FinePolicy;
use crate::constants::{MSG_FIRST_WARNING, MSG_HALTED};
use crate::numbers::{ceil_f64_to_i64, i64_to_f64};
use crate::state::{Outcome, SessionState, SessionStatus};

/// Escalation level, 0 through 4.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WarningStage {
    #[default]
    Clear,
    Warned,
    FinedFirst,
    FinedSecond,
    Halted,
}

impl WarningStage {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Clear => 0,
            Self::Warned => 1,
            Self::FinedFirst => 2,
            Self::FinedSecond => 3,
            Self::Halted => 4,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Warned => "warned",
            Self::FinedFirst => "fined_first",
            Self::FinedSecond => "fined_second",
            Self::Halted => "halted",
        }
    }
}

impl fmt::Display for WarningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a single escalation check did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Escalation {
    Unchanged,
    Warned,
    Fined { stage: WarningStage, amount: i64 },
    Halted,
}

/// Fine for a percentage of the budget held right now, rounded up.
#[must_use]
pub fn fine_amount(budget: i64, pct: f64) -> i64 {
    ceil_f64_to_i64(i64_to_f64(budget) * pct / 100.0).max(0)
}

/// Inspect cumulative emissions and advance the stage by at most one step,
/// or straight to halted past the severe threshold.
pub fn escalate(state: &mut SessionState, fines: &FinePolicy) -> Escalation {
    let thresholds = state.thresholds;
    let stage = state.warning_stage;

    if state.emissions > thresholds.severe_emission && stage < WarningStage::Halted {
        state.warning_stage = WarningStage::Halted;
        state.status = SessionStatus::Completed(Outcome::Halted);
        state.message = MSG_HALTED.to_string();
        log::info!(
            "production halted: emissions {} > severe {} (stage {} -> halted)",
            state.emissions,
            thresholds.severe_emission,
            stage
        );
        return Escalation::Halted;
    }

    if state.emissions <= thresholds.warning_emission {
        return Escalation::Unchanged;
    }

    let (next, pct) = match stage {
        WarningStage::Clear => (WarningStage::Warned, None),
        WarningStage::Warned => (WarningStage::FinedFirst, Some(fines.first_pct)),
        WarningStage::FinedFirst => (WarningStage::FinedSecond, Some(fines.second_pct)),
        WarningStage::FinedSecond | WarningStage::Halted => return Escalation::Unchanged,
    };
    state.warning_stage = next;

    let Some(pct) = pct else {
        state.message = MSG_FIRST_WARNING.to_string();
        log::info!(
            "emission warning issued: emissions {} > warning {}",
            state.emissions,
            thresholds.warning_emission
        );
        return Escalation::Warned;
    };

    let amount = fine_amount(state.budget, pct);
    state.budget -= amount;
    state.message = format!(
        "Regulatory fine! Sustained high emissions cost you ${amount} ({pct}% of your budget)."
    );
    log::info!(
        "stage {next} fine charged: ${amount} ({pct}%), budget now {}",
        state.budget
    );
    Escalation::Fined {
        stage: next,
        amount,
    }
}
