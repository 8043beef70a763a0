//! Configuration management for Strata.
//!
//! Strata uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `STRATA_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation of every section on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and data directory
//! - [`StoreConfig`] - Store URL, credentials, retry policy
//! - [`ExtractionConfig`] - Endpoints, page size, fetch window, load type
//! - [`LoggingConfig`] - Console and file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//! data_dir = "data"
//!
//! [store]
//! url = "https://shop.example.com"
//! consumer_key = "${STRATA_CONSUMER_KEY}"
//! consumer_secret = "${STRATA_CONSUMER_SECRET}"
//!
//! [extraction]
//! endpoints = ["orders", "products", "customers"]
//! page_size = 100
//!
//! [extraction.window]
//! mode = "date_range"
//! date_from = "7 days ago"
//! date_to = "now"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ExtractionConfig, LoadType, LoggingConfig, RetryConfig, StoreConfig,
    StrataConfig, WindowConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
