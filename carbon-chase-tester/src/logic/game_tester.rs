use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use carbon_chase_game::{
    BudgetTier, Escalation, GameConfig, GameEngine, ResultSummary, SelectionError,
    SelectionReport, Session, SessionState, StaticCatalogLoader, WarningStage,
    encode_share_code,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::logic::policy::{GameplayStrategy, PlayerPolicy};

/// Label used for the single tier of fixed-budget plans.
const FIXED_BUDGET_LABEL: &str = "Fixed Budget";
/// Mixed into the seed so slot picks do not mirror the policy's own stream.
const SLOT_RNG_SALT: u64 = 0x5EED_CA7B_0000_0001;
/// Step cap for reselect sweeps, per catalog slot.
const RESELECT_STEPS_PER_SLOT: usize = 3;

/// Description of one automated run.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    /// Products to include; empty means the whole catalog.
    pub products: Vec<String>,
    pub budget: Option<i64>,
    pub max_steps: Option<usize>,
    /// Revisit random slots, filled or not, instead of filling in catalog order.
    pub reselect: bool,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            products: Vec::new(),
            budget: None,
            max_steps: None,
            reselect: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_products(mut self, products: &[&str]) -> Self {
        self.products = products.iter().map(|p| (*p).to_string()).collect();
        self
    }

    #[must_use]
    pub const fn with_budget(mut self, budget: i64) -> Self {
        self.budget = Some(budget);
        self
    }

    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    #[must_use]
    pub const fn with_reselect(mut self) -> Self {
        self.reselect = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// One selection attempt made during a run.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    pub step: usize,
    pub product: String,
    pub process: String,
    pub option: String,
    pub rationale: Option<String>,
    pub accepted: bool,
    pub escalation: Option<Escalation>,
    pub message: String,
    pub budget: i64,
    pub emissions: i64,
    pub happiness: u8,
    pub stage: WarningStage,
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub share_code: Option<String>,
    pub strategy: GameplayStrategy,
    pub turns: Vec<TurnRecord>,
    pub final_state: SessionState,
    pub result: Option<ResultSummary>,
    /// Still playing but no remaining option was affordable.
    pub stalled: bool,
    pub violations: Vec<String>,
}

impl SimulationSummary {
    #[must_use]
    pub fn outcome_label(&self) -> String {
        match (&self.result, self.stalled) {
            (Some(result), _) => result.outcome.to_string(),
            (None, true) => "stalled".to_string(),
            (None, false) => "playing".to_string(),
        }
    }

    #[must_use]
    pub fn accepted_turns(&self) -> usize {
        self.turns.iter().filter(|turn| turn.accepted).count()
    }
}

/// Tracks the per-step ledger invariants of a session.
#[derive(Debug)]
struct InvariantTracker {
    starting_budget: i64,
    fines_paid: i64,
    last_stage: WarningStage,
    fined_stages: HashSet<WarningStage>,
    violations: Vec<String>,
}

impl InvariantTracker {
    fn new(state: &SessionState) -> Self {
        Self {
            starting_budget: state.starting_budget(),
            fines_paid: 0,
            last_stage: state.warning_stage(),
            fined_stages: HashSet::new(),
            violations: Vec::new(),
        }
    }

    fn record(&mut self, step: usize, report: Option<&SelectionReport>) {
        if let Some(Escalation::Fined { stage, amount }) = report.map(|r| r.escalation) {
            self.fines_paid += amount;
            if !self.fined_stages.insert(stage) {
                self.violations
                    .push(format!("step {step}: fine for stage {stage} charged twice"));
            }
        }
    }

    fn check(&mut self, step: usize, session: &Session) {
        let state = session.state();
        let catalog = session.catalog();
        let mut spent = 0;
        let mut emitted = 0;
        for (product, process, option) in state.selections().chosen() {
            match catalog.get(product, process, option) {
                Ok(option) => {
                    spent += option.cost;
                    emitted += option.emissions;
                }
                Err(err) => self.violations.push(format!("step {step}: {err}")),
            }
        }
        if state.emissions() != emitted {
            self.violations.push(format!(
                "step {step}: emissions {} != sum of selections {emitted}",
                state.emissions()
            ));
        }
        let expected_budget = self.starting_budget - spent - self.fines_paid;
        if state.budget() != expected_budget {
            self.violations.push(format!(
                "step {step}: budget {} != expected {expected_budget}",
                state.budget()
            ));
        }
        if state.happiness() > 100 {
            self.violations
                .push(format!("step {step}: happiness {}%", state.happiness()));
        }
        if state.warning_stage() < self.last_stage {
            self.violations.push(format!(
                "step {step}: warning stage fell from {} to {}",
                self.last_stage,
                state.warning_stage()
            ));
        }
        self.last_stage = state.warning_stage();
    }
}

/// Headless deterministic runner for the core game logic.
#[derive(Debug, Clone)]
pub struct GameTester {
    verbose: bool,
    config: GameConfig,
}

impl GameTester {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            config: GameConfig::default(),
        }
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    fn engine_for(&self, plan: &SimulationPlan) -> Result<GameEngine<StaticCatalogLoader>> {
        let mut config = self.config.clone();
        if let Some(budget) = plan.budget {
            config.budget_tiers = vec![BudgetTier::new(FIXED_BUDGET_LABEL, budget)];
        }
        GameEngine::with_config(StaticCatalogLoader, config).context("invalid tester config")
    }

    fn start_session(&self, plan: &SimulationPlan, seed: u64) -> Result<Session> {
        let engine = self.engine_for(plan)?;
        let session = if plan.products.is_empty() {
            engine.create_session(seed)?
        } else {
            let products: Vec<&str> = plan.products.iter().map(String::as_str).collect();
            engine
                .create_session_for(&products, seed)
                .with_context(|| format!("unknown products {products:?}"))?
        };
        Ok(session)
    }

    /// Play one session to completion (or stall) under `plan`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let mut session = self.start_session(plan, seed)?;
        let mut policy = plan.strategy.create_policy(seed);
        let mut tracker = InvariantTracker::new(session.state());
        let mut turns = Vec::new();
        let mut stalled = false;

        if self.verbose {
            let state = session.state();
            println!(
                "  🏭 {} ${} | limit {} | focus {} | {} slots",
                state.budget_tier(),
                state.budget(),
                state.thresholds().max_emission,
                state.focus(),
                session.total_slots()
            );
        }

        let slots = slot_order(&session, plan, seed);
        let max_steps = plan.max_steps.unwrap_or(slots.len());

        for (step, (product, process)) in slots.into_iter().take(max_steps).enumerate() {
            if !session.status().is_playing() {
                break;
            }
            if !plan.reselect && session.selection(&product, &process).is_some() {
                continue;
            }
            let Ok(process_def) = session.catalog().process(&product, &process) else {
                tracker
                    .violations
                    .push(format!("step {step}: {product}/{process} missing"));
                continue;
            };
            let Some(decision) = policy.pick_option(session.state(), process_def) else {
                continue;
            };

            let result = session.apply(&product, &process, &decision.option);
            let (accepted, report) = match result {
                Ok(report) => (true, Some(report)),
                Err(SelectionError::InsufficientBudget { .. }) => (false, None),
                Err(err) => {
                    tracker.violations.push(format!("step {step}: {err}"));
                    (false, None)
                }
            };
            tracker.record(step, report.as_ref());
            tracker.check(step, &session);

            if plan.reselect && accepted && session.status().is_playing() {
                check_idempotent(
                    &mut session,
                    &mut tracker,
                    step,
                    (product.as_str(), process.as_str(), decision.option.as_str()),
                );
            }

            let state = session.state();
            let turn = TurnRecord {
                step,
                product,
                process,
                option: decision.option,
                rationale: decision.rationale,
                accepted,
                escalation: report.map(|r| r.escalation),
                message: state.message().to_string(),
                budget: state.budget(),
                emissions: state.emissions(),
                happiness: state.happiness(),
                stage: state.warning_stage(),
            };
            if self.verbose {
                log_turn(&turn, policy.as_ref());
            }
            turns.push(turn);

            if !accepted && !plan.reselect {
                stalled = true;
                break;
            }
        }

        let final_state = session.state().clone();
        Ok(SimulationSummary {
            seed,
            share_code: encode_share_code(seed),
            strategy: plan.strategy,
            turns,
            result: session.summary(),
            stalled: stalled && final_state.status().is_playing(),
            final_state,
            violations: tracker.violations,
        })
    }
}

/// Slots to visit: catalog order, or a seeded random walk for reselect sweeps.
fn slot_order(session: &Session, plan: &SimulationPlan, seed: u64) -> Vec<(String, String)> {
    let all: Vec<(String, String)> = session
        .catalog()
        .products()
        .iter()
        .flat_map(|product| {
            product
                .processes
                .iter()
                .map(|process| (product.name.clone(), process.name.clone()))
        })
        .collect();
    if !plan.reselect || all.is_empty() {
        return all;
    }
    let mut rng = ChaCha20Rng::seed_from_u64(seed ^ SLOT_RNG_SALT);
    let steps = plan
        .max_steps
        .unwrap_or(all.len() * RESELECT_STEPS_PER_SLOT);
    (0..steps)
        .map(|_| all[rng.gen_range(0..all.len())].clone())
        .collect()
}

fn check_idempotent(
    session: &mut Session,
    tracker: &mut InvariantTracker,
    step: usize,
    (product, process, option): (&str, &str, &str),
) {
    let before = session.state().clone();
    match session.apply(product, process, option) {
        Ok(report) if report.unchanged && session.state() == &before => {}
        Ok(_) => tracker
            .violations
            .push(format!("step {step}: re-applying {option} changed the session")),
        Err(err) => tracker
            .violations
            .push(format!("step {step}: re-applying {option} failed: {err}")),
    }
}

fn log_turn(turn: &TurnRecord, policy: &(dyn PlayerPolicy + Send)) {
    let status = if turn.accepted { "✓" } else { "✗" };
    println!(
        "    {status} [{}] {}/{} -> {} ({}) | ${} | em {} | {}% | {}",
        policy.name(),
        turn.product,
        turn.process,
        turn.option,
        turn.rationale.as_deref().unwrap_or("-"),
        turn.budget,
        turn.emissions,
        turn.happiness,
        turn.stage
    );
}
