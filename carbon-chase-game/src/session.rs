//! A playable session: catalog, balance config and state bound together.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::catalog::{Catalog, CatalogError};
use crate::config::GameConfig;
use crate::engine::{SelectionEngine, SelectionError, SelectionReport};
use crate::result::{ResultSummary, result_summary};
use crate::state::{SessionState, SessionStatus};
use crate::thresholds::Thresholds;

/// Accepted/rejected verdict plus the message to show the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionFeedback {
    pub accepted: bool,
    pub message: String,
}

/// High-level session wrapper binding a catalog and balance table to a mutable state.
#[derive(Debug, Clone)]
pub struct Session {
    catalog: Arc<Catalog>,
    config: GameConfig,
    state: SessionState,
}

impl Session {
    /// Start a session, drawing the budget tier and focus product from `rng`.
    #[must_use]
    pub fn new<R>(catalog: Arc<Catalog>, config: GameConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let state = SessionState::create(&catalog, &config, rng);
        Self {
            catalog,
            config,
            state,
        }
    }

    /// Start a session from a deterministic seed.
    #[must_use]
    pub fn with_seed(catalog: Arc<Catalog>, config: GameConfig, seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        Self::new(catalog, config, &mut rng)
    }

    /// Start a session with a fixed budget instead of a random tier.
    #[must_use]
    pub fn with_budget(catalog: Arc<Catalog>, config: GameConfig, label: &str, budget: i64) -> Self {
        let state = SessionState::with_budget(&catalog, &config, label, budget);
        Self {
            catalog,
            config,
            state,
        }
    }

    /// Apply one selection through the engine pipeline.
    ///
    /// # Errors
    ///
    /// See [`SelectionEngine::apply`].
    pub fn apply(
        &mut self,
        product: &str,
        process: &str,
        option: &str,
    ) -> Result<SelectionReport, SelectionError> {
        SelectionEngine::new(&self.catalog, &self.config).apply(
            &mut self.state,
            product,
            process,
            option,
        )
    }

    /// Apply a selection and fold the result into player-facing feedback.
    pub fn select(&mut self, product: &str, process: &str, option: &str) -> SelectionFeedback {
        match self.apply(product, process, option) {
            Ok(report) => SelectionFeedback {
                accepted: true,
                message: report.message,
            },
            Err(err @ SelectionError::InsufficientBudget { .. }) => {
                log::debug!("selection rejected: {err}");
                SelectionFeedback {
                    accepted: false,
                    message: self.state.message().to_string(),
                }
            }
            Err(err) => SelectionFeedback {
                accepted: false,
                message: err.to_string(),
            },
        }
    }

    /// Discard the current state and start over with a fresh draw.
    pub fn reset<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.state = SessionState::create(&self.catalog, &self.config, rng);
    }

    /// Switch the product shown to the player.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for a product outside the catalog.
    pub fn set_focus(&mut self, product: &str) -> Result<(), CatalogError> {
        self.catalog.product(product)?;
        self.state.focus = product.to_string();
        Ok(())
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn budget(&self) -> i64 {
        self.state.budget()
    }

    #[must_use]
    pub const fn emissions(&self) -> i64 {
        self.state.emissions()
    }

    #[must_use]
    pub const fn happiness(&self) -> u8 {
        self.state.happiness()
    }

    #[must_use]
    pub const fn thresholds(&self) -> &Thresholds {
        self.state.thresholds()
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.state.status()
    }

    #[must_use]
    pub fn selection(&self, product: &str, process: &str) -> Option<&str> {
        self.state.selection(product, process)
    }

    #[must_use]
    pub fn filled_slots(&self) -> usize {
        self.state.selections().filled_count()
    }

    #[must_use]
    pub fn total_slots(&self) -> usize {
        self.state.selections().total_count()
    }

    /// End-screen summary once the session has completed.
    #[must_use]
    pub fn summary(&self) -> Option<ResultSummary> {
        result_summary(&self.state)
    }

    /// Consume the session, returning the underlying state.
    #[must_use]
    pub fn into_state(self) -> SessionState {
        self.state
    }
}
