//! Carbon Chase Game Engine
//!
//! Platform-agnostic core logic for the Carbon Chase production-selection game.
//! The player picks one production option for every process step of each
//! product, trading off cost, emissions and customer happiness against a
//! budget-scaled emission limit. This crate holds all rules without UI or
//! platform-specific dependencies.

pub mod catalog;
pub mod config;
pub(crate) mod constants;
pub mod engine;
pub mod happiness;
pub mod numbers;
pub mod result;
pub mod seed;
pub mod session;
pub mod state;
pub mod termination;
pub mod thresholds;
pub mod warning;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::sync::Arc;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, Process, ProcessOption, Product};
pub use config::{BudgetTier, ConfigError, FinePolicy, GameConfig, TerminationPolicy};
pub use engine::{SelectionEngine, SelectionError, SelectionReport};
pub use result::{ResultSummary, result_summary};
pub use seed::{decode_share_code, encode_share_code, seed_label, share_code_seeds};
pub use session::{SelectionFeedback, Session};
pub use state::{Outcome, Selections, SessionState, SessionStatus, SuccessTier};
pub use thresholds::{EmissionLevel, ThresholdPolicy, Thresholds};
pub use warning::{Escalation, WarningStage};

/// Source of the product catalog. Balance settings are passed to
/// [`GameEngine::with_config`] instead.
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the product catalog from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or fails validation.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;
}

/// Loader backed by the catalog embedded in the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalogLoader;

impl CatalogLoader for StaticCatalogLoader {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        Catalog::load_from_static()
    }
}

/// Main game engine for creating sessions
pub struct GameEngine<L>
where
    L: CatalogLoader,
{
    loader: L,
    config: GameConfig,
}

impl<L> GameEngine<L>
where
    L: CatalogLoader,
{
    /// Create a game engine with default balance settings
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            config: GameConfig::default(),
        }
    }

    /// Create a game engine with custom balance settings
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is inconsistent.
    pub fn with_config(loader: L, config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { loader, config })
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Create a new session from a deterministic seed
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn create_session(&self, seed: u64) -> Result<Session, L::Error> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        self.create_session_with_rng(&mut rng)
    }

    /// Create a new session drawing its randomness from `rng`
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn create_session_with_rng<R>(&self, rng: &mut R) -> Result<Session, L::Error>
    where
        R: Rng + ?Sized,
    {
        let catalog = Arc::new(self.loader.load_catalog()?);
        Ok(Session::new(catalog, self.config.clone(), rng))
    }

    /// Create a session covering only the named products
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or a product is unknown.
    pub fn create_session_for(&self, products: &[&str], seed: u64) -> Result<Session, L::Error>
    where
        L::Error: From<CatalogError>,
    {
        let catalog = self.loader.load_catalog()?.restricted_to(products)?;
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        Ok(Session::new(Arc::new(catalog), self.config.clone(), &mut rng))
    }
}
