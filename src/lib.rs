// Strata - WooCommerce to relational tables extractor
// Copyright (c) 2025 Strata Contributors
// Licensed under the MIT License

//! # Strata - WooCommerce to relational tables
//!
//! Strata pulls orders, products and customers from a WooCommerce store's REST
//! API and decomposes every nested record into a set of flat, linked tables
//! ready for incremental loading.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Fetching** paginated endpoints with a retry policy for rate limits and server errors
//! - **Decomposing** records into a root row plus rows in child tables, to any depth
//! - **Tracking** each table's columns in first-seen order, stable across runs
//! - **Declaring** every table with its primary key in a manifest
//!
//! ## Architecture
//!
//! Strata follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (extraction, decomposition, state)
//! - [`adapters`] - External integrations (WooCommerce API, CSV output)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use strata::config::load_config;
//! use strata::core::extract::ExtractCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("strata.toml")?;
//!     let coordinator = ExtractCoordinator::new(config).await?;
//!
//!     let summary = coordinator.execute().await?;
//!     println!("Extracted {} records", summary.records_written());
//!     Ok(())
//! }
//! ```
//!
//! ## Decomposition
//!
//! An order with line items, each carrying taxes, becomes three tables:
//!
//! | Table | Primary key |
//! |---|---|
//! | `order` | `id` |
//! | `order_line_items` | `id`, `order_id` |
//! | `order_line_items_taxes` | `row_nr`, `order_id`, `line_item_id` |
//!
//! Elements without a natural `id` are keyed by their position in the source
//! array (`row_nr`).
//!
//! ## Error Handling
//!
//! Strata uses the [`domain::StrataError`] type for all errors. A record that
//! cannot be decomposed is a [`domain::RecordError`]: it is logged and skipped
//! while the rest of the endpoint continues. Everything else aborts the run.
//!
//! ## Logging
//!
//! Strata uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(endpoint = "orders", "Extracting endpoint");
//! warn!(endpoint = "orders", entity_id = "unknown", "Skipping record");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
