use carbon_chase_game::{
    Catalog, EmissionLevel, Escalation, GameConfig, Outcome, SelectionError, Session,
    SessionStatus, SuccessTier, WarningStage,
};
use std::collections::HashSet;
use std::sync::Arc;

fn catalog_for(products: &[&str]) -> Arc<Catalog> {
    let catalog = Catalog::load_from_static().unwrap();
    if products.is_empty() {
        Arc::new(catalog)
    } else {
        Arc::new(catalog.restricted_to(products).unwrap())
    }
}

fn medium_session(products: &[&str]) -> Session {
    Session::with_budget(
        catalog_for(products),
        GameConfig::default(),
        "Medium Budget",
        10_000,
    )
}

#[test]
fn scenario_a_first_selection_charges_budget() {
    let mut session = medium_session(&[]);
    assert_eq!(session.thresholds().max_emission, 6_000);
    assert_eq!(
        session.state().message(),
        "Welcome to Carbon Chase! Medium Budget of $10000. Select production methods that balance cost, emissions, and customer happiness."
    );

    let report = session.apply("Pizza", "Baking", "Wood Fired").unwrap();
    assert_eq!(report.escalation, Escalation::Unchanged);
    assert_eq!(session.budget(), 8_000);
    assert_eq!(session.emissions(), 1_500);
    assert_eq!(session.state().warning_stage(), WarningStage::Clear);
    assert_eq!(session.state().emission_level(), EmissionLevel::Normal);
    assert!(session.status().is_playing());
}

#[test]
fn scenario_b_warning_then_one_fine_per_stage() {
    let mut session = medium_session(&["Pizza"]);
    session
        .apply("Pizza", "Ingredient Sourcing", "Conventional")
        .unwrap();
    let report = session.apply("Pizza", "Baking", "Wood Fired").unwrap();
    // 3300 > 3000 warning line.
    assert_eq!(report.escalation, Escalation::Warned);
    assert_eq!(session.state().warning_stage(), WarningStage::Warned);
    assert_eq!(session.budget(), 6_000);
    assert!(session.state().message().starts_with("Warning:"));
    assert_eq!(session.state().emission_level(), EmissionLevel::Warning);

    let report = session
        .apply("Pizza", "Dough Preparation", "Handmade")
        .unwrap();
    assert_eq!(
        report.escalation,
        Escalation::Fined {
            stage: WarningStage::FinedFirst,
            amount: 175
        }
    );
    assert_eq!(session.budget(), 3_325);

    let report = session
        .apply("Pizza", "Dough Preparation", "Mass Produced")
        .unwrap();
    assert_eq!(
        report.escalation,
        Escalation::Fined {
            stage: WarningStage::FinedSecond,
            amount: 433
        }
    );
    assert_eq!(session.budget(), 3_892);
    assert_eq!(session.emissions(), 4_100);
    assert!(session.state().message().starts_with("Regulatory fine!"));

    let report = session
        .apply("Pizza", "Dough Preparation", "Handmade")
        .unwrap();
    assert_eq!(report.escalation, Escalation::Unchanged);
    assert_eq!(session.budget(), 2_892);
    assert_eq!(session.state().warning_stage(), WarningStage::FinedSecond);
    assert!(session.status().is_playing());
}

#[test]
fn scenario_c_severe_emissions_halt_production() {
    let mut session = medium_session(&[]);
    let report = session
        .apply("E-Bike", "Battery Production", "Lithium Mining")
        .unwrap();
    assert_eq!(report.escalation, Escalation::Halted);
    assert_eq!(session.state().warning_stage(), WarningStage::Halted);
    assert_eq!(session.status(), SessionStatus::Completed(Outcome::Halted));
    assert!(session.state().message().starts_with("Production Halted!"));
}

#[test]
fn scenario_c_severe_jump_skips_unpaid_fines() {
    let mut session = medium_session(&["Pizza"]);
    session
        .apply("Pizza", "Ingredient Sourcing", "Conventional")
        .unwrap();
    session.apply("Pizza", "Baking", "Wood Fired").unwrap();
    assert_eq!(session.state().warning_stage(), WarningStage::Warned);

    let report = session.apply("Pizza", "Baking", "Gas Oven").unwrap();
    assert_eq!(report.replaced.as_deref(), Some("Wood Fired"));
    assert_eq!(report.escalation, Escalation::Halted);
    assert_eq!(session.emissions(), 4_300);
    assert_eq!(session.budget(), 6_500);
    assert_eq!(session.status(), SessionStatus::Completed(Outcome::Halted));
}

#[test]
fn scenario_d_all_slots_filled_green_and_happy() {
    let mut session = medium_session(&["Pizza"]);
    for (process, option) in [
        ("Ingredient Sourcing", "Local Seasonal"),
        ("Dough Preparation", "Mass Produced"),
        ("Baking", "Solar"),
        ("Packaging", "Biodegradable"),
    ] {
        session.apply("Pizza", process, option).unwrap();
    }
    assert_eq!(session.filled_slots(), session.total_slots());
    assert_eq!(
        session.status(),
        SessionStatus::Completed(Outcome::Success(SuccessTier::Excellent))
    );
    assert_eq!(session.happiness(), 65);
    assert!(session.happiness() >= session.config().termination.min_happiness_pct);
    let summary = session.summary().unwrap();
    assert!(summary.emission_ratio < 0.4);
    assert!(summary.score > 0);
}

#[test]
fn scenario_d_sweater_finishes_good() {
    let mut session = medium_session(&["Sweater"]);
    session
        .apply("Sweater", "Fabric Production", "Organic Cotton")
        .unwrap();
    session
        .apply("Sweater", "Dyeing", "Plant-Based Dyes")
        .unwrap();
    // 2500 / 6000 = 0.42
    assert_eq!(
        session.status(),
        SessionStatus::Completed(Outcome::Success(SuccessTier::Good))
    );
    assert_eq!(session.budget(), 2_500);
}

#[test]
fn scenario_e_unaffordable_option_is_rejected() {
    let mut session = Session::with_budget(
        catalog_for(&[]),
        GameConfig::default(),
        "Low Budget",
        5_000,
    );
    let before = session.state().clone();
    let err = session
        .apply("E-Bike", "Frame Production", "Carbon Fiber")
        .unwrap_err();
    match err {
        SelectionError::InsufficientBudget {
            ref option,
            needed,
            available,
        } => {
            assert_eq!(option, "Carbon Fiber");
            assert_eq!(needed, 7_000);
            assert_eq!(available, 5_000);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(session.budget(), before.budget());
    assert_eq!(session.emissions(), before.emissions());
    assert_eq!(session.state().selections(), before.selections());
    assert_eq!(session.state().warning_stage(), before.warning_stage());
    assert!(session.state().message().contains("short $2000"));
}

#[test]
fn unhappy_customers_end_the_session() {
    let mut cfg = GameConfig::default();
    cfg.termination.min_happiness_pct = 75;
    let mut session = Session::with_budget(catalog_for(&["E-Bike"]), cfg, "High Budget", 20_000);
    session
        .apply("E-Bike", "Battery Production", "Recycled Batteries")
        .unwrap();
    // 4 of 5 = 80%.
    assert!(session.status().is_playing());
    session.apply("E-Bike", "Assembly", "Automated").unwrap();
    // 7 of 10 = 70%.
    assert_eq!(
        session.status(),
        SessionStatus::Completed(Outcome::UnhappyCustomers)
    );
    assert_eq!(session.emissions(), 4_500);
    assert!(session.state().message().starts_with("Game Over: Unhappy Customers!"));
}

#[test]
fn budget_tiers_are_all_reachable() {
    let catalog = catalog_for(&[]);
    let mut seen = HashSet::new();
    for seed in 0..64 {
        let session = Session::with_seed(Arc::clone(&catalog), GameConfig::default(), seed);
        let state = session.state();
        assert_eq!(state.budget(), state.starting_budget());
        assert!(
            state
                .message()
                .starts_with(&format!("Welcome to Carbon Chase! {}", state.budget_tier()))
        );
        seen.insert(state.budget());
    }
    assert_eq!(seen, HashSet::from([5_000, 10_000, 20_000]));
}

#[test]
fn low_budget_flag_tracks_remaining_budget() {
    let mut session = Session::with_budget(
        catalog_for(&["Pizza"]),
        GameConfig::default(),
        "Low Budget",
        5_000,
    );
    assert!(!session.state().is_budget_low());
    session
        .apply("Pizza", "Ingredient Sourcing", "Local Seasonal")
        .unwrap();
    session
        .apply("Pizza", "Dough Preparation", "Mass Produced")
        .unwrap();
    assert_eq!(session.budget(), 1_000);
    assert!(!session.state().is_budget_low());
    session.apply("Pizza", "Packaging", "Plastic").unwrap();
    assert_eq!(session.budget(), 0);
    assert!(session.state().is_budget_low());
}
