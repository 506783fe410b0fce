use anyhow::{Result, ensure};
use carbon_chase_game::{
    GameConfig, Outcome, SuccessTier, WarningStage, decode_share_code, encode_share_code,
};

use crate::logic::game_tester::{SimulationPlan, SimulationSummary};
use crate::logic::policy::GameplayStrategy;

/// Products shipped in the bundled catalog.
pub const PRODUCTS: [&str; 5] = ["Pizza", "E-Bike", "Smartphone", "Sweater", "Toilet Paper"];

/// Budget used by the single-product strategy runs.
const STRATEGY_BUDGET: i64 = 10_000;

/// A named simulation plan run by the logic tester.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: String,
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(key: impl Into<String>, name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            plan,
        }
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test"),
        ("cheapest", "Cheapest Strategy on Each Product"),
        ("greenest", "Greenest Strategy on Each Product"),
        ("happiest", "Happiest Strategy on Each Product"),
        ("balanced", "Balanced Strategy on Each Product"),
        ("random", "Random Strategy on Each Product"),
        ("strategy-matrix", "Every Strategy on Each Product"),
        ("golden-runs", "Known Outcomes for Fixed Runs"),
        ("full-catalog", "Full Catalog Playthrough"),
        ("invariant-sweep", "Random Reselection Invariant Sweep"),
    ]
}

/// Every key accepted by [`get_scenarios`], in listing order.
pub fn all_scenario_keys() -> Vec<String> {
    list_scenarios()
        .into_iter()
        .map(|(key, _)| key.to_string())
        .collect()
}

/// Build the scenarios registered under `key`.
pub fn get_scenarios(key: &str) -> Option<Vec<TestScenario>> {
    let scenarios = match key {
        "smoke" => vec![smoke()],
        "strategy-matrix" => GameplayStrategy::ALL
            .into_iter()
            .flat_map(strategy_runs)
            .collect(),
        "golden-runs" => golden_runs(),
        "full-catalog" => vec![full_catalog()],
        "invariant-sweep" => invariant_sweep(),
        other => {
            let strategy = GameplayStrategy::ALL
                .into_iter()
                .find(|strategy| strategy.key() == other)?;
            strategy_runs(strategy)
        }
    };
    Some(scenarios)
}

fn smoke() -> TestScenario {
    let plan = SimulationPlan::new(GameplayStrategy::Cheapest)
        .with_max_steps(1)
        .with_expectation(expect_fresh_session);
    TestScenario::new("smoke", "Smoke Test", plan)
}

fn expect_fresh_session(summary: &SimulationSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(
        summary.turns.len() <= 1,
        "smoke run made {} selections",
        summary.turns.len()
    );
    let expected = GameConfig::default()
        .thresholds
        .compute(state.starting_budget());
    ensure!(
        state.thresholds() == &expected,
        "thresholds {:?} do not match starting budget {}",
        state.thresholds(),
        state.starting_budget()
    );
    ensure!(
        state.starting_budget() > 0,
        "starting budget {} is not positive",
        state.starting_budget()
    );
    ensure!(
        summary.share_code == encode_share_code(summary.seed),
        "share code {:?} does not belong to seed {}",
        summary.share_code,
        summary.seed
    );
    if let Some(code) = &summary.share_code {
        ensure!(
            decode_share_code(code) == Some(summary.seed),
            "share code {code} does not reproduce seed {}",
            summary.seed
        );
    }
    Ok(())
}

fn strategy_runs(strategy: GameplayStrategy) -> Vec<TestScenario> {
    PRODUCTS
        .into_iter()
        .map(|product| {
            let plan = SimulationPlan::new(strategy)
                .with_products(&[product])
                .with_budget(STRATEGY_BUDGET)
                .with_expectation(expect_run_ends)
                .with_expectation(expect_consistent_outcome);
            TestScenario::new(
                strategy.key(),
                format!("{strategy} Strategy - {product}"),
                plan,
            )
        })
        .collect()
}

fn expect_run_ends(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.result.is_some() || summary.stalled,
        "run stopped while still playing after {} turns",
        summary.turns.len()
    );
    Ok(())
}

/// Each end state must agree with the ledger that produced it.
fn expect_consistent_outcome(summary: &SimulationSummary) -> Result<()> {
    let Some(result) = &summary.result else {
        return Ok(());
    };
    let state = &summary.final_state;
    match result.outcome {
        Outcome::Success(_) => {
            ensure!(
                result.slots_filled == result.total_slots,
                "success with {}/{} slots filled",
                result.slots_filled,
                result.total_slots
            );
            ensure!(result.budget_left >= 0, "success while bankrupt");
            ensure!(
                result.emissions <= result.max_emission,
                "success above the emission limit"
            );
            ensure!(result.score > 0, "success scored {}", result.score);
        }
        Outcome::Halted => ensure!(
            state.warning_stage() == WarningStage::Halted,
            "halted at warning stage {}",
            state.warning_stage()
        ),
        Outcome::ExcessiveEmissions => ensure!(
            result.emissions > result.max_emission,
            "emission failure at {} of {}",
            result.emissions,
            result.max_emission
        ),
        Outcome::Bankrupt => ensure!(
            result.budget_left < 0,
            "bankrupt with ${} left",
            result.budget_left
        ),
        Outcome::UnhappyCustomers => {}
    }
    if !result.outcome.is_success() {
        ensure!(result.score == 0, "failed run scored {}", result.score);
    }
    Ok(())
}

fn expect_outcome(outcome: Outcome) -> impl Fn(&SimulationSummary) -> Result<()> + Send + Sync {
    move |summary: &SimulationSummary| {
        let actual = summary.result.as_ref().map(|result| result.outcome);
        ensure!(
            actual == Some(outcome),
            "expected {outcome}, got {}",
            summary.outcome_label()
        );
        Ok(())
    }
}

fn golden_runs() -> Vec<TestScenario> {
    let runs = [
        (
            GameplayStrategy::Happiest,
            "Sweater",
            Outcome::Success(SuccessTier::Excellent),
        ),
        (
            GameplayStrategy::Greenest,
            "Pizza",
            Outcome::Success(SuccessTier::Good),
        ),
        (GameplayStrategy::Cheapest, "Smartphone", Outcome::Halted),
    ];
    runs.into_iter()
        .map(|(strategy, product, outcome)| {
            let plan = SimulationPlan::new(strategy)
                .with_products(&[product])
                .with_budget(STRATEGY_BUDGET)
                .with_expectation(expect_outcome(outcome))
                .with_expectation(expect_consistent_outcome);
            TestScenario::new(
                "golden-runs",
                format!("{strategy} {product} ends {outcome}"),
                plan,
            )
        })
        .collect()
}

fn full_catalog() -> TestScenario {
    let plan = SimulationPlan::new(GameplayStrategy::Balanced)
        .with_expectation(expect_run_ends)
        .with_expectation(expect_consistent_outcome)
        .with_expectation(|summary: &SimulationSummary| -> Result<()> {
            ensure!(
                !summary
                    .result
                    .as_ref()
                    .is_some_and(|result| result.outcome.is_success()),
                "full catalog cannot fit under any emission limit"
            );
            Ok(())
        });
    TestScenario::new("full-catalog", "Full Catalog Playthrough", plan)
}

fn invariant_sweep() -> Vec<TestScenario> {
    let mut scenarios: Vec<TestScenario> = PRODUCTS
        .into_iter()
        .map(|product| {
            let plan = SimulationPlan::new(GameplayStrategy::Random)
                .with_products(&[product])
                .with_reselect()
                .with_expectation(expect_consistent_outcome);
            TestScenario::new(
                "invariant-sweep",
                format!("Random Reselection - {product}"),
                plan,
            )
        })
        .collect();
    let plan = SimulationPlan::new(GameplayStrategy::Random)
        .with_reselect()
        .with_expectation(expect_consistent_outcome);
    scenarios.push(TestScenario::new(
        "invariant-sweep",
        "Random Reselection - Full Catalog",
        plan,
    ));
    scenarios
}
