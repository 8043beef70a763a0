//! External system integrations for Strata.
//!
//! - [`woocommerce`] - WooCommerce REST API client, pagination and retries
//! - [`storage`] - table sinks, manifests and the run-state store
//!
//! # Design Pattern
//!
//! The extraction core talks to storage through the traits in
//! [`storage::traits`], so writers can be tested against in-memory sinks.
//!
//! ```rust,no_run
//! use strata::adapters::woocommerce::{FetchFilter, WooCommerceClient};
//! use strata::config::load_config;
//! use strata::domain::ids::Endpoint;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("strata.toml")?;
//! let client = WooCommerceClient::connect(&config.store).await?;
//!
//! let mut pages = client.fetch(Endpoint::Customers, &FetchFilter::All, 100);
//! while let Some(page) = pages.next_page().await? {
//!     println!("{} customers", page.records.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod storage;
pub mod woocommerce;
