use std::fmt;

use carbon_chase_game::{Process, ProcessOption, SessionState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub option: String,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn new(option: impl Into<String>, rationale: Option<String>) -> Self {
        Self {
            option: option.into(),
            rationale,
        }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Pick an option for one process step. `None` when the process has no options.
    fn pick_option(&mut self, state: &SessionState, process: &Process) -> Option<PolicyDecision>;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameplayStrategy {
    Cheapest,
    Greenest,
    Happiest,
    Balanced,
    Random,
}

impl GameplayStrategy {
    pub const ALL: [Self; 5] = [
        Self::Cheapest,
        Self::Greenest,
        Self::Happiest,
        Self::Balanced,
        Self::Random,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cheapest => "Cheapest",
            Self::Greenest => "Greenest",
            Self::Happiest => "Happiest",
            Self::Balanced => "Balanced",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub fn key(self) -> String {
        self.label().to_lowercase()
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Cheapest => Box::new(CheapestPolicy),
            Self::Greenest => Box::new(GreenestPolicy),
            Self::Happiest => Box::new(HappiestPolicy),
            Self::Balanced => Box::new(BalancedPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct CheapestPolicy;
struct GreenestPolicy;
struct HappiestPolicy;
struct BalancedPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

/// Options the current budget can pay for, falling back to all options so
/// the engine gets to report the shortfall.
fn candidates<'a>(state: &SessionState, process: &'a Process) -> Vec<&'a ProcessOption> {
    let affordable: Vec<_> = process
        .options
        .iter()
        .filter(|option| option.cost <= state.budget())
        .collect();
    if affordable.is_empty() {
        process.options.iter().collect()
    } else {
        affordable
    }
}

impl PlayerPolicy for CheapestPolicy {
    fn name(&self) -> &'static str {
        "Cheapest"
    }

    fn pick_option(&mut self, state: &SessionState, process: &Process) -> Option<PolicyDecision> {
        let option = candidates(state, process)
            .into_iter()
            .min_by_key(|option| (option.cost, option.emissions))?;
        Some(PolicyDecision::new(
            &option.name,
            Some(format!("cost {}", option.cost)),
        ))
    }
}

impl PlayerPolicy for GreenestPolicy {
    fn name(&self) -> &'static str {
        "Greenest"
    }

    fn pick_option(&mut self, state: &SessionState, process: &Process) -> Option<PolicyDecision> {
        let option = candidates(state, process)
            .into_iter()
            .min_by_key(|option| (option.emissions, option.cost))?;
        Some(PolicyDecision::new(
            &option.name,
            Some(format!("emissions {}", option.emissions)),
        ))
    }
}

impl PlayerPolicy for HappiestPolicy {
    fn name(&self) -> &'static str {
        "Happiest"
    }

    fn pick_option(&mut self, state: &SessionState, process: &Process) -> Option<PolicyDecision> {
        let option = candidates(state, process)
            .into_iter()
            .max_by_key(|option| (option.happiness, -option.emissions))?;
        Some(PolicyDecision::new(
            &option.name,
            Some(format!("happiness {}", option.happiness)),
        ))
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn pick_option(&mut self, state: &SessionState, process: &Process) -> Option<PolicyDecision> {
        let (option, score) = candidates(state, process)
            .into_iter()
            .map(|option| (option, balanced_score(state, option)))
            .max_by_key(|(_, score)| *score)?;
        Some(PolicyDecision::new(
            &option.name,
            Some(format!("score {score}")),
        ))
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn pick_option(&mut self, state: &SessionState, process: &Process) -> Option<PolicyDecision> {
        let options = candidates(state, process);
        if options.is_empty() {
            return None;
        }
        let option = options[self.rng.gen_range(0..options.len())];
        Some(PolicyDecision::new(&option.name, None))
    }
}

/// Weigh happiness against the option's share of the remaining emission headroom
/// and budget, in permille.
fn balanced_score(state: &SessionState, option: &ProcessOption) -> i64 {
    let headroom = (state.thresholds().warning_emission - state.emissions()).max(1);
    let budget = state.budget().max(1);
    let emission_cost = option.emissions * 1_000 / headroom;
    let money_cost = option.cost * 1_000 / budget;
    i64::from(option.happiness) * 200 - emission_cost - money_cost / 2
}
