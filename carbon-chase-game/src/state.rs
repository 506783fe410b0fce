//! Session state: budget, emissions, happiness, selections and status.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::Catalog;
use crate::config::{BudgetTier, GameConfig};
use crate::constants::{LOW_BUDGET_WARNING, MEDIUM_BUDGET};
use crate::thresholds::{EmissionLevel, Thresholds};
use crate::warning::WarningStage;

/// Grade of a completed production line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessTier {
    Excellent,
    Good,
    Acceptable,
}

impl SuccessTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Acceptable => "acceptable",
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Regulators stopped production after severe emissions.
    Halted,
    /// Emissions passed the hard limit.
    ExcessiveEmissions,
    /// Happiness fell below the floor.
    UnhappyCustomers,
    /// Budget went negative.
    Bankrupt,
    /// Every process step was filled.
    Success(SuccessTier),
}

impl Outcome {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Halted => f.write_str("halted"),
            Self::ExcessiveEmissions => f.write_str("excessive_emissions"),
            Self::UnhappyCustomers => f.write_str("unhappy_customers"),
            Self::Bankrupt => f.write_str("bankrupt"),
            Self::Success(tier) => write!(f, "success_{}", tier.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Playing,
    Completed(Outcome),
}

impl SessionStatus {
    #[must_use]
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    #[must_use]
    pub const fn outcome(self) -> Option<Outcome> {
        match self {
            Self::Playing => None,
            Self::Completed(outcome) => Some(outcome),
        }
    }
}

/// The chosen option, if any, for one process step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSelection {
    pub process: String,
    pub choice: Option<String>,
}

/// Every process slot of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSelections {
    pub product: String,
    pub slots: Vec<SlotSelection>,
}

/// Per-product, per-process choices, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selections {
    products: Vec<ProductSelections>,
}

impl Selections {
    /// One unset slot for every process in the catalog.
    #[must_use]
    pub fn unset_for(catalog: &Catalog) -> Self {
        let products = catalog
            .products()
            .iter()
            .map(|product| ProductSelections {
                product: product.name.clone(),
                slots: product
                    .processes
                    .iter()
                    .map(|process| SlotSelection {
                        process: process.name.clone(),
                        choice: None,
                    })
                    .collect(),
            })
            .collect();
        Self { products }
    }

    #[must_use]
    pub fn products(&self) -> &[ProductSelections] {
        &self.products
    }

    #[must_use]
    pub fn slot(&self, product: &str, process: &str) -> Option<&SlotSelection> {
        self.products
            .iter()
            .find(|p| p.product == product)?
            .slots
            .iter()
            .find(|slot| slot.process == process)
    }

    pub(crate) fn slot_mut(&mut self, product: &str, process: &str) -> Option<&mut SlotSelection> {
        self.products
            .iter_mut()
            .find(|p| p.product == product)?
            .slots
            .iter_mut()
            .find(|slot| slot.process == process)
    }

    /// Chosen option name for a slot, `None` when unset or unknown.
    #[must_use]
    pub fn choice(&self, product: &str, process: &str) -> Option<&str> {
        self.slot(product, process)?.choice.as_deref()
    }

    /// Iterate `(product, process, option)` for every filled slot.
    pub fn chosen(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.products.iter().flat_map(|product| {
            product.slots.iter().filter_map(move |slot| {
                slot.choice.as_deref().map(|choice| {
                    (
                        product.product.as_str(),
                        slot.process.as_str(),
                        choice,
                    )
                })
            })
        })
    }

    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.chosen().count()
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.products.iter().map(|p| p.slots.len()).sum()
    }

    #[must_use]
    pub fn all_filled(&self) -> bool {
        self.products
            .iter()
            .all(|p| p.slots.iter().all(|slot| slot.choice.is_some()))
    }
}

/// Mutable record of one playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub(crate) budget: i64,
    pub(crate) starting_budget: i64,
    pub(crate) budget_tier: String,
    pub(crate) emissions: i64,
    pub(crate) happiness_pct: u8,
    pub(crate) warning_stage: WarningStage,
    pub(crate) status: SessionStatus,
    pub(crate) thresholds: Thresholds,
    pub(crate) selections: Selections,
    pub(crate) focus: String,
    pub(crate) message: String,
}

impl SessionState {
    /// Start a session with a budget tier and focus product drawn from `rng`.
    #[must_use]
    pub fn create<R>(catalog: &Catalog, cfg: &GameConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let tier = draw_budget_tier(&cfg.budget_tiers, rng);
        let mut state = Self::with_budget(catalog, cfg, &tier.label, tier.budget);
        let products = catalog.products();
        if !products.is_empty() {
            state.focus = products[rng.gen_range(0..products.len())].name.clone();
        }
        log::debug!(
            "session created: {} ${} (max emission {}), focus {}",
            state.budget_tier,
            state.budget,
            state.thresholds.max_emission,
            state.focus
        );
        state
    }

    /// Start a session with an explicit budget; the focus is the first product.
    #[must_use]
    pub fn with_budget(catalog: &Catalog, cfg: &GameConfig, tier_label: &str, budget: i64) -> Self {
        let focus = catalog
            .product_names()
            .next()
            .map(str::to_string)
            .unwrap_or_default();
        Self {
            budget,
            starting_budget: budget,
            budget_tier: tier_label.to_string(),
            emissions: 0,
            happiness_pct: 0,
            warning_stage: WarningStage::Clear,
            status: SessionStatus::Playing,
            thresholds: cfg.thresholds.compute(budget),
            selections: Selections::unset_for(catalog),
            focus,
            message: format!(
                "Welcome to Carbon Chase! {tier_label} of ${budget}. Select production methods that balance cost, emissions, and customer happiness."
            ),
        }
    }

    #[must_use]
    pub const fn budget(&self) -> i64 {
        self.budget
    }

    #[must_use]
    pub const fn starting_budget(&self) -> i64 {
        self.starting_budget
    }

    #[must_use]
    pub fn budget_tier(&self) -> &str {
        &self.budget_tier
    }

    #[must_use]
    pub const fn emissions(&self) -> i64 {
        self.emissions
    }

    #[must_use]
    pub const fn happiness(&self) -> u8 {
        self.happiness_pct
    }

    #[must_use]
    pub const fn warning_stage(&self) -> WarningStage {
        self.warning_stage
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub const fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    #[must_use]
    pub const fn selections(&self) -> &Selections {
        &self.selections
    }

    #[must_use]
    pub fn selection(&self, product: &str, process: &str) -> Option<&str> {
        self.selections.choice(product, process)
    }

    #[must_use]
    pub fn focus(&self) -> &str {
        &self.focus
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn emission_level(&self) -> EmissionLevel {
        self.thresholds.level(self.emissions)
    }

    #[must_use]
    pub const fn is_budget_low(&self) -> bool {
        self.budget < LOW_BUDGET_WARNING
    }
}

fn draw_budget_tier<R>(tiers: &[BudgetTier], rng: &mut R) -> BudgetTier
where
    R: Rng + ?Sized,
{
    if tiers.is_empty() {
        return BudgetTier::new("Medium Budget", MEDIUM_BUDGET);
    }
    tiers[rng.gen_range(0..tiers.len())].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn fresh_state_has_every_slot_unset() {
        let catalog = Catalog::load_from_static().unwrap();
        let state = SessionState::with_budget(&catalog, &GameConfig::default(), "Medium Budget", 10_000);
        assert_eq!(state.selections().total_count(), catalog.slot_count());
        assert_eq!(state.selections().filled_count(), 0);
        assert!(!state.selections().all_filled());
        assert_eq!(state.selection("Pizza", "Baking"), None);
        assert_eq!(state.thresholds().max_emission, 6_000);
        assert_eq!(state.happiness(), 0);
        assert_eq!(state.warning_stage(), WarningStage::Clear);
        assert!(state.status().is_playing());
        assert_eq!(state.focus(), "Pizza");
        assert!(state.message().contains("Medium Budget of $10000"));
    }

    #[test]
    fn create_draws_a_configured_tier() {
        let catalog = Catalog::load_from_static().unwrap();
        let cfg = GameConfig::default();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..20 {
            let state = SessionState::create(&catalog, &cfg, &mut rng);
            assert!(
                cfg.budget_tiers
                    .iter()
                    .any(|t| t.label == state.budget_tier() && t.budget == state.budget())
            );
            assert_eq!(state.starting_budget(), state.budget());
            assert!(catalog.product_names().any(|name| name == state.focus()));
        }
    }

    #[test]
    fn create_is_reproducible_for_a_seed() {
        let catalog = Catalog::load_from_static().unwrap();
        let cfg = GameConfig::default();
        let a = SessionState::create(&catalog, &cfg, &mut ChaCha20Rng::seed_from_u64(99));
        let b = SessionState::create(&catalog, &cfg, &mut ChaCha20Rng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn selections_track_filled_slots() {
        let catalog = Catalog::load_from_static()
            .unwrap()
            .restricted_to(&["Sweater"])
            .unwrap();
        let mut selections = Selections::unset_for(&catalog);
        selections
            .slot_mut("Sweater", "Dyeing")
            .unwrap()
            .choice = Some("Chemical Dyes".to_string());
        assert_eq!(selections.filled_count(), 1);
        assert_eq!(
            selections.chosen().collect::<Vec<_>>(),
            [("Sweater", "Dyeing", "Chemical Dyes")]
        );
        assert!(selections.slot_mut("Sweater", "Knitting").is_none());
    }

    #[test]
    fn outcome_labels_are_stable() {
        assert_eq!(Outcome::Halted.to_string(), "halted");
        assert_eq!(
            Outcome::Success(SuccessTier::Good).to_string(),
            "success_good"
        );
        assert!(Outcome::Success(SuccessTier::Acceptable).is_success());
        assert!(!Outcome::Bankrupt.is_success());
        assert_eq!(
            SessionStatus::Completed(Outcome::Bankrupt).outcome(),
            Some(Outcome::Bankrupt)
        );
    }
}
