//! End-of-session checks, evaluated after every accepted selection.
use crate::config::TerminationPolicy;
use crate::constants::{
    MSG_BANKRUPT, MSG_EXCESSIVE_EMISSIONS, MSG_HALTED, MSG_SUCCESS_ACCEPTABLE,
    MSG_SUCCESS_EXCELLENT, MSG_SUCCESS_GOOD, MSG_UNHAPPY_CUSTOMERS,
};
use crate::state::{Outcome, SessionState, SessionStatus, SuccessTier};

/// Grade a finished production line by its emission ratio.
#[must_use]
pub fn classify_success(ratio: f64, policy: &TerminationPolicy) -> SuccessTier {
    if ratio < policy.excellent_ratio {
        SuccessTier::Excellent
    } else if ratio < policy.good_ratio {
        SuccessTier::Good
    } else {
        SuccessTier::Acceptable
    }
}

/// First matching terminal condition, in priority order.
#[must_use]
pub fn check(state: &SessionState, policy: &TerminationPolicy) -> Option<Outcome> {
    if state.emissions > state.thresholds.max_emission {
        return Some(Outcome::ExcessiveEmissions);
    }
    if state.happiness_pct < policy.min_happiness_pct {
        return Some(Outcome::UnhappyCustomers);
    }
    if state.budget < 0 {
        return Some(Outcome::Bankrupt);
    }
    if state.selections.all_filled() {
        let ratio = state.thresholds.emission_ratio(state.emissions);
        return Some(Outcome::Success(classify_success(ratio, policy)));
    }
    None
}

/// End-screen message for an outcome.
#[must_use]
pub const fn outcome_message(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Halted => MSG_HALTED,
        Outcome::ExcessiveEmissions => MSG_EXCESSIVE_EMISSIONS,
        Outcome::UnhappyCustomers => MSG_UNHAPPY_CUSTOMERS,
        Outcome::Bankrupt => MSG_BANKRUPT,
        Outcome::Success(SuccessTier::Excellent) => MSG_SUCCESS_EXCELLENT,
        Outcome::Success(SuccessTier::Good) => MSG_SUCCESS_GOOD,
        Outcome::Success(SuccessTier::Acceptable) => MSG_SUCCESS_ACCEPTABLE,
    }
}

/// Complete the session if a terminal condition holds. Only acts while playing.
pub fn evaluate(state: &mut SessionState, policy: &TerminationPolicy) -> Option<Outcome> {
    if !state.status.is_playing() {
        return None;
    }
    let outcome = check(state, policy)?;
    state.status = SessionStatus::Completed(outcome);
    state.message = outcome_message(outcome).to_string();
    log::info!(
        "session completed: {outcome} (budget {}, emissions {}/{}, happiness {}%)",
        state.budget,
        state.emissions,
        state.thresholds.max_emission,
        state.happiness_pct
    );
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::GameConfig;

    fn playing_state() -> (Catalog, SessionState) {
        let catalog = Catalog::load_from_static()
            .unwrap()
            .restricted_to(&["Sweater"])
            .unwrap();
        let mut state =
            SessionState::with_budget(&catalog, &GameConfig::default(), "Medium Budget", 10_000);
        state.happiness_pct = 80;
        (catalog, state)
    }

    fn fill_all(state: &mut SessionState) {
        for (process, option) in [
            ("Fabric Production", "Recycled Wool"),
            ("Dyeing", "Plant-Based Dyes"),
        ] {
            let slot = state.selections.slot_mut("Sweater", process).unwrap();
            slot.choice = Some(option.to_string());
        }
    }

    #[test]
    fn priority_order_emissions_before_happiness_before_budget() {
        let policy = TerminationPolicy::default();
        let (_catalog, mut state) = playing_state();
        state.emissions = 6_001;
        state.happiness_pct = 10;
        state.budget = -1;
        assert_eq!(check(&state, &policy), Some(Outcome::ExcessiveEmissions));
        state.emissions = 6_000;
        assert_eq!(check(&state, &policy), Some(Outcome::UnhappyCustomers));
        state.happiness_pct = 40;
        assert_eq!(check(&state, &policy), Some(Outcome::Bankrupt));
        state.budget = 0;
        assert_eq!(check(&state, &policy), None);
    }

    #[test]
    fn all_filled_classifies_by_ratio() {
        let policy = TerminationPolicy::default();
        let (_catalog, mut state) = playing_state();
        fill_all(&mut state);
        state.emissions = 1_800;
        assert_eq!(
            check(&state, &policy),
            Some(Outcome::Success(SuccessTier::Excellent))
        );
        state.emissions = 2_400;
        assert_eq!(
            check(&state, &policy),
            Some(Outcome::Success(SuccessTier::Good))
        );
        state.emissions = 4_200;
        assert_eq!(
            check(&state, &policy),
            Some(Outcome::Success(SuccessTier::Acceptable))
        );
    }

    #[test]
    fn evaluate_sets_status_once() {
        let policy = TerminationPolicy::default();
        let (_catalog, mut state) = playing_state();
        state.budget = -5;
        assert_eq!(evaluate(&mut state, &policy), Some(Outcome::Bankrupt));
        assert_eq!(state.status, SessionStatus::Completed(Outcome::Bankrupt));
        assert_eq!(state.message, MSG_BANKRUPT);

        state.emissions = 9_999;
        assert_eq!(evaluate(&mut state, &policy), None);
        assert_eq!(state.status, SessionStatus::Completed(Outcome::Bankrupt));
    }

    #[test]
    fn classify_uses_strict_cutoffs() {
        let policy = TerminationPolicy::default();
        assert_eq!(classify_success(0.0, &policy), SuccessTier::Excellent);
        assert_eq!(classify_success(0.4, &policy), SuccessTier::Good);
        assert_eq!(classify_success(0.7, &policy), SuccessTier::Acceptable);
        assert_eq!(classify_success(f64::INFINITY, &policy), SuccessTier::Acceptable);
    }
}
