//! End-of-session summary and scoring
use serde::{Deserialize, Serialize};

use crate::constants::{SCORE_EMISSION_WEIGHT, SCORE_HAPPINESS_WEIGHT};
use crate::numbers::floor_snapped_f64_to_i64;
use crate::state::{Outcome, SessionState, SuccessTier};
use crate::termination::outcome_message;
use crate::warning::WarningStage;

/// Complete summary of a finished session for the result screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub outcome: Outcome,
    pub headline: String,
    pub epilogue: String,
    pub budget_tier: String,
    pub starting_budget: i64,
    pub budget_left: i64,
    pub emissions: i64,
    pub max_emission: i64,
    pub emission_ratio: f64,
    pub happiness_pct: u8,
    pub warning_stage: WarningStage,
    pub slots_filled: usize,
    pub total_slots: usize,
    pub score: i64,
}

/// Short title for an outcome.
#[must_use]
pub const fn headline(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Halted => "Production Halted",
        Outcome::ExcessiveEmissions => "Emission Limit Breached",
        Outcome::UnhappyCustomers => "Customers Walked Away",
        Outcome::Bankrupt => "Out of Money",
        Outcome::Success(SuccessTier::Excellent) => "Sustainability Leader",
        Outcome::Success(SuccessTier::Good) => "Responsible Producer",
        Outcome::Success(SuccessTier::Acceptable) => "Production Complete",
    }
}

/// Score for a state. Zero unless the session ended in success.
///
/// Success scores the budget left, plus up to 1000 for the unused share of
/// the emission limit, plus ten points per happiness percent.
#[must_use]
pub fn score(state: &SessionState) -> i64 {
    let Some(outcome) = state.status().outcome() else {
        return 0;
    };
    if !outcome.is_success() {
        return 0;
    }
    let ratio = state.thresholds().emission_ratio(state.emissions());
    let emission_bonus = floor_snapped_f64_to_i64((1.0 - ratio) * SCORE_EMISSION_WEIGHT);
    let happiness_bonus = i64::from(state.happiness()) * SCORE_HAPPINESS_WEIGHT;
    (state.budget() + emission_bonus + happiness_bonus).max(0)
}

/// Build the result-screen summary. `None` while the session is still playing.
#[must_use]
pub fn result_summary(state: &SessionState) -> Option<ResultSummary> {
    let outcome = state.status().outcome()?;
    let selections = state.selections();
    Some(ResultSummary {
        outcome,
        headline: headline(outcome).to_string(),
        epilogue: outcome_message(outcome).to_string(),
        budget_tier: state.budget_tier().to_string(),
        starting_budget: state.starting_budget(),
        budget_left: state.budget(),
        emissions: state.emissions(),
        max_emission: state.thresholds().max_emission,
        emission_ratio: state.thresholds().emission_ratio(state.emissions()),
        happiness_pct: state.happiness(),
        warning_stage: state.warning_stage(),
        slots_filled: selections.filled_count(),
        total_slots: selections.total_count(),
        score: score(state),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::GameConfig;
    use crate::engine::SelectionEngine;
    use crate::state::SessionStatus;

    fn pizza() -> Catalog {
        Catalog::load_from_static()
            .unwrap()
            .restricted_to(&["Pizza"])
            .unwrap()
    }

    #[test]
    fn playing_sessions_have_no_summary() {
        let catalog = pizza();
        let state =
            SessionState::with_budget(&catalog, &GameConfig::default(), "Medium Budget", 10_000);
        assert!(result_summary(&state).is_none());
        assert_eq!(score(&state), 0);
    }

    #[test]
    fn excellent_run_scores_budget_emissions_and_happiness() {
        let catalog = pizza();
        let cfg = GameConfig::default();
        let engine = SelectionEngine::new(&catalog, &cfg);
        let mut state = SessionState::with_budget(&catalog, &cfg, "Medium Budget", 10_000);
        for (process, option) in [
            ("Ingredient Sourcing", "Local Seasonal"),
            ("Dough Preparation", "Mass Produced"),
            ("Baking", "Solar"),
            ("Packaging", "Biodegradable"),
        ] {
            engine.apply(&mut state, "Pizza", process, option).unwrap();
        }

        let summary = result_summary(&state).unwrap();
        assert_eq!(summary.outcome, Outcome::Success(SuccessTier::Excellent));
        assert_eq!(summary.headline, "Sustainability Leader");
        assert_eq!(summary.budget_left, 500);
        assert_eq!(summary.emissions, 2_200);
        assert_eq!(summary.happiness_pct, 65);
        assert_eq!((summary.slots_filled, summary.total_slots), (4, 4));
        // 500 + floor(633.3) + 650
        assert_eq!(summary.score, 1_783);
    }

    #[test]
    fn emission_bonus_floors_exact_ratios() {
        let catalog = pizza();
        let mut state =
            SessionState::with_budget(&catalog, &GameConfig::default(), "Medium Budget", 10_000);
        state.status = SessionStatus::Completed(Outcome::Success(SuccessTier::Excellent));
        state.happiness_pct = 0;
        // 396 / 6000 = 0.066, so the bonus is exactly 934.
        state.emissions = 396;
        assert_eq!(score(&state), 10_934);
        state.emissions = 1_146;
        assert_eq!(score(&state), 10_809);
    }

    #[test]
    fn failures_score_zero() {
        let catalog = pizza();
        let cfg = GameConfig::default();
        let mut state = SessionState::with_budget(&catalog, &cfg, "Low Budget", 5_000);
        SelectionEngine::new(&catalog, &cfg)
            .apply(&mut state, "Pizza", "Ingredient Sourcing", "Conventional")
            .unwrap();
        SelectionEngine::new(&catalog, &cfg)
            .apply(&mut state, "Pizza", "Packaging", "Plastic")
            .unwrap();
        // 3600 emissions is past the severe line of 2100.
        let summary = result_summary(&state).unwrap();
        assert_eq!(summary.outcome, Outcome::Halted);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.epilogue, outcome_message(Outcome::Halted));
    }
}
