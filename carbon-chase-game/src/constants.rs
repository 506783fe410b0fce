//! Centralized balance and tuning constants for Carbon Chase.
//!
//! These values define the deterministic math for the core simulation.
//! `GameConfig::default()` is built from them, so tweaking the balance table
//! happens here and goes through review like any other code change.

// Threshold policy ---------------------------------------------------------
pub(crate) const BASE_EMISSION_THRESHOLD: f64 = 5_000.0;
pub(crate) const REFERENCE_BUDGET: f64 = 10_000.0;
pub(crate) const EMISSION_SCALE_FACTOR: f64 = 1.2;
pub(crate) const SEVERE_EMISSION_RATIO: f64 = 0.7;
pub(crate) const WARNING_EMISSION_RATIO: f64 = 0.5;

// Warning escalation -------------------------------------------------------
pub(crate) const FIRST_FINE_PCT: f64 = 5.0;
pub(crate) const SECOND_FINE_PCT: f64 = 10.0;

// Termination --------------------------------------------------------------
pub(crate) const MIN_HAPPINESS_PCT: u8 = 40;
pub(crate) const EXCELLENT_RATIO_CUTOFF: f64 = 0.4;
pub(crate) const GOOD_RATIO_CUTOFF: f64 = 0.7;

// Happiness ----------------------------------------------------------------
pub(crate) const MAX_OPTION_RATING: u8 = 5;
pub(crate) const MIN_OPTION_RATING: u8 = 1;

// Budget tiers -------------------------------------------------------------
pub(crate) const LOW_BUDGET: i64 = 5_000;
pub(crate) const MEDIUM_BUDGET: i64 = 10_000;
pub(crate) const HIGH_BUDGET: i64 = 20_000;
pub(crate) const LOW_BUDGET_WARNING: i64 = 1_000;

// Scoring ------------------------------------------------------------------
pub(crate) const SCORE_EMISSION_WEIGHT: f64 = 1_000.0;
pub(crate) const SCORE_HAPPINESS_WEIGHT: i64 = 10;

// Messages -----------------------------------------------------------------
pub(crate) const MSG_FIRST_WARNING: &str = "Warning: Your emissions are approaching dangerous levels. Regulators are watching.";
pub(crate) const MSG_HALTED: &str =
    "Production Halted! Regulators shut down your operation for severe emissions.";
pub(crate) const MSG_EXCESSIVE_EMISSIONS: &str =
    "Game Over: Excessive Emissions! Your production emits too much CO2.";
pub(crate) const MSG_UNHAPPY_CUSTOMERS: &str =
    "Game Over: Unhappy Customers! Your product doesn't meet quality expectations.";
pub(crate) const MSG_BANKRUPT: &str = "Game Over: Bankrupt! You've exceeded your budget.";
pub(crate) const MSG_SUCCESS_EXCELLENT: &str =
    "Congratulations! You created a sustainable product with low emissions!";
pub(crate) const MSG_SUCCESS_GOOD: &str =
    "Product Complete! A solid production line with moderate emissions.";
pub(crate) const MSG_SUCCESS_ACCEPTABLE: &str =
    "Product Complete! You've finished production, but could reduce emissions further.";
