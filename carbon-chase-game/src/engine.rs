//! Selection engine: validates and applies one option choice per player action.
//!
//! Each accepted selection runs the same fixed pipeline: commit the choice,
//! escalate warnings, recompute happiness, then check for a terminal state.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};
use crate::config::GameConfig;
use crate::happiness;
use crate::state::{Outcome, SessionState, SessionStatus};
use crate::termination;
use crate::warning::{self, Escalation};

/// Reasons a selection is rejected. The session is left as it was.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] CatalogError),
    #[error("not enough budget for {option}: need ${needed}, have ${available}")]
    InsufficientBudget {
        option: String,
        needed: i64,
        available: i64,
    },
    #[error("session already completed ({outcome})")]
    SessionCompleted { outcome: Outcome },
}

impl SelectionError {
    /// Shortfall for budget rejections.
    #[must_use]
    pub const fn shortfall(&self) -> Option<i64> {
        match self {
            Self::InsufficientBudget {
                needed, available, ..
            } => Some(*needed - *available),
            _ => None,
        }
    }
}

/// What an accepted selection did to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionReport {
    /// Option replaced in the slot, refunded before the new charge.
    pub replaced: Option<String>,
    /// The option was already chosen; nothing changed.
    pub unchanged: bool,
    pub escalation: Escalation,
    pub status: SessionStatus,
    pub message: String,
}

/// Applies selections against a catalog under a balance configuration.
#[derive(Debug, Clone, Copy)]
pub struct SelectionEngine<'a> {
    catalog: &'a Catalog,
    config: &'a GameConfig,
}

impl<'a> SelectionEngine<'a> {
    #[must_use]
    pub const fn new(catalog: &'a Catalog, config: &'a GameConfig) -> Self {
        Self { catalog, config }
    }

    /// Choose `option` for the `(product, process)` slot.
    ///
    /// # Errors
    ///
    /// * [`SelectionError::SessionCompleted`] once the session has ended.
    /// * [`SelectionError::InvalidSelection`] when a key does not resolve.
    /// * [`SelectionError::InsufficientBudget`] when the option costs more
    ///   than the current budget; only the session message changes.
    pub fn apply(
        &self,
        state: &mut SessionState,
        product: &str,
        process: &str,
        option: &str,
    ) -> Result<SelectionReport, SelectionError> {
        if let SessionStatus::Completed(outcome) = state.status {
            log::warn!("selection {product}/{process}/{option} after session completed");
            return Err(SelectionError::SessionCompleted { outcome });
        }

        let chosen = self.catalog.get(product, process, option)?;
        let previous = state
            .selections
            .slot(product, process)
            .ok_or_else(|| CatalogError::NotFound {
                path: format!("{product} / {process}"),
            })?
            .choice
            .clone();

        if previous.as_deref() == Some(option) {
            return Ok(SelectionReport {
                replaced: None,
                unchanged: true,
                escalation: Escalation::Unchanged,
                status: state.status,
                message: state.message.clone(),
            });
        }

        if chosen.cost > state.budget {
            let err = SelectionError::InsufficientBudget {
                option: chosen.name.clone(),
                needed: chosen.cost,
                available: state.budget,
            };
            state.message = format!(
                "Not enough budget for {}! You need ${} but only have ${} (short ${}).",
                chosen.name,
                chosen.cost,
                state.budget,
                chosen.cost - state.budget
            );
            log::warn!("{err}");
            return Err(err);
        }

        let refunded = previous
            .as_deref()
            .map(|name| self.catalog.get(product, process, name))
            .transpose()?;

        let Some(slot) = state.selections.slot_mut(product, process) else {
            return Err(CatalogError::NotFound {
                path: format!("{product} / {process}"),
            }
            .into());
        };
        slot.choice = Some(chosen.name.clone());
        if let Some(old) = refunded {
            state.budget += old.cost;
            state.emissions -= old.emissions;
        }
        state.budget -= chosen.cost;
        state.emissions += chosen.emissions;
        state.message.clone_from(&chosen.info);
        log::debug!(
            "selected {product}/{process}/{option}: cost {} emissions {} (replaced {:?}) -> budget {} emissions {}",
            chosen.cost,
            chosen.emissions,
            previous,
            state.budget,
            state.emissions
        );

        let escalation = warning::escalate(state, &self.config.fines);
        happiness::recompute(state, self.catalog)?;
        termination::evaluate(state, &self.config.termination);

        Ok(SelectionReport {
            replaced: previous,
            unchanged: false,
            escalation,
            status: state.status,
            message: state.message.clone(),
        })
    }
}
