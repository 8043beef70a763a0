//! JSON file run-state store
//!
//! The previous run's state is read from one file and the new state is written
//! to another, so a failed run never overwrites the state it started from.

use super::traits::StateStore;
use crate::core::state::RunState;
use crate::domain::{Result, StrataError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Run state kept in JSON files
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    input: PathBuf,
    output: PathBuf,
}

impl JsonStateStore {
    /// Create a store reading `input` and writing `output`
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    /// State file the previous run left
    pub fn input_path(&self) -> &Path {
        &self.input
    }

    /// State file this run writes
    pub fn output_path(&self) -> &Path {
        &self.output
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn load(&self) -> Result<RunState> {
        let contents = match tokio::fs::read_to_string(&self.input).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.input.display(), "No previous state found");
                return Ok(RunState::default());
            }
            Err(e) => {
                return Err(StrataError::State(format!(
                    "Failed to read state file {}: {}",
                    self.input.display(),
                    e
                )))
            }
        };

        if contents.trim().is_empty() {
            return Ok(RunState::default());
        }

        serde_json::from_str(&contents).map_err(|e| {
            StrataError::State(format!(
                "Invalid state file {}: {}",
                self.input.display(),
                e
            ))
        })
    }

    async fn save(&self, state: &RunState) -> Result<()> {
        if let Some(parent) = self.output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&self.output, json).await.map_err(|e| {
            StrataError::State(format!(
                "Failed to write state file {}: {}",
                self.output.display(),
                e
            ))
        })?;

        tracing::debug!(
            path = %self.output.display(),
            tables = state.len(),
            "Saved run state"
        );
        Ok(())
    }
}
