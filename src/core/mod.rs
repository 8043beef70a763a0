//! Core business logic for Strata.
//!
//! This module contains the decomposition engine and the orchestration of a run.
//!
//! # Modules
//!
//! - [`extract`] - Extraction orchestration, window resolution and summaries
//! - [`state`] - Persisted column layouts between runs
//! - [`transform`] - Flattening and the declarative decomposition schemas
//! - [`writer`] - Recursive table writers and column tracking
//!
//! # Extraction Workflow
//!
//! 1. **Connect**: Probe the store API with the configured credentials
//! 2. **Load State**: Read the column lists of the previous run
//! 3. **Fetch**: Pull the pages of each endpoint, one after another
//! 4. **Decompose**: Split every record into its root row and child rows
//! 5. **Declare**: Write one manifest per produced table
//! 6. **Persist**: Save the aggregated column lists for the next run
//!
//! # Example
//!
//! ```rust,no_run
//! use strata::config::load_config;
//! use strata::core::extract::ExtractCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("strata.toml")?;
//! let coordinator = ExtractCoordinator::new(config).await?;
//!
//! let summary = coordinator.execute().await?;
//! println!("Records: {}", summary.records_written());
//! println!("Skipped: {}", summary.records_skipped());
//! # Ok(())
//! # }
//! ```

pub mod extract;
pub mod state;
pub mod transform;
pub mod writer;
