//! State manager for run-state persistence
//!
//! This module provides the StateManager, which loads the previous run's
//! column layout and saves the aggregated layout of the current run.

use super::run_state::RunState;
use crate::adapters::storage::StateStore;
use crate::domain::{Result, TableDescriptor};

/// State manager for run-state persistence
///
/// Holds the state loaded at the start of the run and accumulates the column
/// lists of every table produced until [`StateManager::save`] is called.
pub struct StateManager {
    store: Box<dyn StateStore>,
    previous: RunState,
    current: RunState,
}

impl StateManager {
    /// Load the previous run state from `store`
    ///
    /// # Errors
    ///
    /// Returns an error if the stored state cannot be read or parsed.
    pub async fn load(store: Box<dyn StateStore>) -> Result<Self> {
        let previous = store.load().await?;

        tracing::debug!(tables = previous.len(), "Loaded previous run state");

        Ok(Self {
            store,
            current: previous.clone(),
            previous,
        })
    }

    /// State the previous run left, used to seed column order
    pub fn previous(&self) -> &RunState {
        &self.previous
    }

    /// Record the final columns of produced tables
    ///
    /// Tables produced by more than one endpoint get the union of their
    /// columns, in first-seen order.
    pub fn record<'a, I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = &'a TableDescriptor>,
    {
        for descriptor in descriptors {
            self.current
                .merge_columns(descriptor.name.as_str(), descriptor.columns.iter().cloned());
        }
    }

    /// State as it will be saved
    pub fn current(&self) -> &RunState {
        &self.current
    }

    /// Persist the aggregated state for the next run
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    pub async fn save(&self) -> Result<()> {
        self.store.save(&self.current).await?;

        tracing::info!(tables = self.current.len(), "Saved run state");
        Ok(())
    }
}
