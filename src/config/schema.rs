//! Configuration schema types
//!
//! This module defines the configuration structure for Strata. Every section
//! validates itself into a `Result<(), String>` and the root aggregates them.

use crate::config::SecretString;
use crate::domain::ids::Endpoint;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Main Strata configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrataConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Store connection settings
    pub store: StoreConfig,

    /// What to extract and how
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StrataConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.store.validate()?;
        self.extraction.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Root of the `in/` and `out/` data folders
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.data_dir.as_os_str().is_empty() {
            return Err("application.data_dir cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: default_data_dir(),
        }
    }
}

/// Retry configuration for store requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts for server and connectivity failures
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Factor applied to the server's Retry-After hint on HTTP 429
    #[serde(default = "default_rate_limit_multiplier")]
    pub rate_limit_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(format!(
                "store.retry.max_attempts must be between 1 and 10, got {}",
                self.max_attempts
            ));
        }

        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "store.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }

        if self.rate_limit_multiplier <= 0.0 {
            return Err("store.retry.rate_limit_multiplier must be > 0".to_string());
        }

        if self.max_delay_ms < self.initial_delay_ms {
            return Err("store.retry.max_delay_ms must be >= initial_delay_ms".to_string());
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            rate_limit_multiplier: default_rate_limit_multiplier(),
        }
    }
}

/// WooCommerce store connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the shop, e.g. `https://shop.example.com`
    pub url: String,

    /// REST API consumer key
    /// Stored securely in memory and automatically zeroized on drop
    pub consumer_key: SecretString,

    /// REST API consumer secret
    /// Stored securely in memory and automatically zeroized on drop
    pub consumer_secret: SecretString,

    /// REST API version path segment
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Send credentials as query parameters instead of a Basic auth header
    ///
    /// Some hosts strip the Authorization header; WooCommerce accepts
    /// `consumer_key`/`consumer_secret` in the query string over HTTPS.
    #[serde(default)]
    pub query_string_auth: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// **SECURITY WARNING**: only disable this against local development stores.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl StoreConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.url.is_empty() {
            return Err("store.url cannot be empty".to_string());
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err("store.url must start with http:// or https://".to_string());
        }

        url::Url::parse(&self.url).map_err(|e| format!("store.url is not a valid URL: {e}"))?;

        if self.consumer_key.expose_secret().is_empty() {
            return Err("store.consumer_key cannot be empty".to_string());
        }

        if self.consumer_secret.expose_secret().is_empty() {
            return Err("store.consumer_secret cannot be empty".to_string());
        }

        if self.api_version.trim_matches('/').is_empty() {
            return Err("store.api_version cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("store.timeout_seconds must be > 0".to_string());
        }

        self.retry.validate()?;
        Ok(())
    }
}

/// Destination load type declared in table manifests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadType {
    /// Merge rows by primary key
    #[default]
    Incremental,
    /// Replace the destination table
    Full,
}

impl LoadType {
    /// Whether manifests should request an incremental merge
    pub fn is_incremental(&self) -> bool {
        matches!(self, LoadType::Incremental)
    }
}

/// Fetch window selection
///
/// The three modes are mutually exclusive. Bounds are kept as written in the
/// configuration and resolved to timestamps when the run starts, so relative
/// expressions like `"7 days ago"` are evaluated against the run's clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WindowConfig {
    /// Full history
    #[default]
    All,

    /// Records created between two bounds
    DateRange {
        /// Lower bound, absolute or relative
        date_from: String,
        /// Upper bound, absolute or relative
        #[serde(default = "default_date_to")]
        date_to: String,
    },

    /// Records whose `field` is at least `value`, up to now
    FieldLowerBound {
        /// Query parameter name, e.g. `modified_after`
        field: String,
        /// Lower bound sent as-is
        value: String,
    },
}

/// Extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Endpoints to extract, in order (case-insensitive)
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Load type declared in manifests
    #[serde(default)]
    pub load_type: LoadType,

    /// Decompose `meta_data` arrays into child tables
    ///
    /// When disabled, `meta_data` is kept on the parent row as JSON text.
    #[serde(default = "default_true")]
    pub flatten_meta_data: bool,

    /// Fetch window
    #[serde(default)]
    pub window: WindowConfig,
}

impl ExtractionConfig {
    /// Parses the configured endpoint names
    ///
    /// Duplicates are dropped, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first unknown endpoint
    pub fn endpoints(&self) -> Result<Vec<Endpoint>, String> {
        let mut parsed = Vec::with_capacity(self.endpoints.len());
        for name in &self.endpoints {
            let endpoint = Endpoint::from_str(name)?;
            if !parsed.contains(&endpoint) {
                parsed.push(endpoint);
            }
        }
        Ok(parsed)
    }

    fn validate(&self) -> Result<(), String> {
        if self.endpoints.is_empty() {
            return Err("extraction.endpoints cannot be empty".to_string());
        }
        self.endpoints()
            .map_err(|e| format!("extraction.endpoints: {e}"))?;

        if !(1..=100).contains(&self.page_size) {
            return Err(format!(
                "extraction.page_size must be between 1 and 100, got {}",
                self.page_size
            ));
        }

        match &self.window {
            WindowConfig::All => {}
            WindowConfig::DateRange { date_from, date_to } => {
                if date_from.trim().is_empty() {
                    return Err("extraction.window.date_from cannot be empty".to_string());
                }
                if date_to.trim().is_empty() {
                    return Err("extraction.window.date_to cannot be empty".to_string());
                }
            }
            WindowConfig::FieldLowerBound { field, value } => {
                if field.trim().is_empty() {
                    return Err("extraction.window.field cannot be empty".to_string());
                }
                if value.trim().is_empty() {
                    return Err("extraction.window.value cannot be empty".to_string());
                }
            }
        }

        Ok(())
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            page_size: default_page_size(),
            load_type: LoadType::default(),
            flatten_meta_data: true,
            window: WindowConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }

    /// Console-only logging, used before a configuration file is loaded
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_true() -> bool {
    true
}

fn default_api_version() -> String {
    "wc/v3".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_rate_limit_multiplier() -> f64 {
    2.0
}

fn default_endpoints() -> Vec<String> {
    Endpoint::ALL.iter().map(|e| e.path().to_string()).collect()
}

fn default_page_size() -> u32 {
    100
}

fn default_date_to() -> String {
    "now".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn store_config() -> StoreConfig {
        StoreConfig {
            url: "https://shop.example.com".to_string(),
            consumer_key: secret_string("ck_test".to_string()),
            consumer_secret: secret_string("cs_test".to_string()),
            api_version: default_api_version(),
            query_string_auth: false,
            timeout_seconds: 60,
            tls_verify: true,
            retry: RetryConfig::default(),
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_config_validation() {
        let mut config = store_config();
        assert!(config.validate().is_ok());

        config.url = "shop.example.com".to_string();
        assert!(config.validate().is_err());

        config = store_config();
        config.consumer_secret = secret_string(String::new());
        assert!(config.validate().is_err());

        config = store_config();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_extraction_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(
            config.endpoints().unwrap(),
            vec![Endpoint::Orders, Endpoint::Products, Endpoint::Customers]
        );
        assert_eq!(config.page_size, 100);
        assert!(config.load_type.is_incremental());
        assert!(config.flatten_meta_data);
        assert_eq!(config.window, WindowConfig::All);
    }

    #[test]
    fn test_extraction_endpoints_case_insensitive_and_deduplicated() {
        let config = ExtractionConfig {
            endpoints: vec![
                "Customers".to_string(),
                "ORDERS".to_string(),
                "customers".to_string(),
            ],
            ..ExtractionConfig::default()
        };
        assert_eq!(
            config.endpoints().unwrap(),
            vec![Endpoint::Customers, Endpoint::Orders]
        );
    }

    #[test]
    fn test_extraction_validation() {
        let mut config = ExtractionConfig::default();
        assert!(config.validate().is_ok());

        config.page_size = 0;
        assert!(config.validate().is_err());
        config.page_size = 101;
        assert!(config.validate().is_err());

        config = ExtractionConfig {
            endpoints: vec!["coupons".to_string()],
            ..ExtractionConfig::default()
        };
        assert!(config.validate().is_err());

        config = ExtractionConfig {
            window: WindowConfig::FieldLowerBound {
                field: String::new(),
                value: "2024-01-01".to_string(),
            },
            ..ExtractionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window_config_deserialization() {
        let window: WindowConfig = toml::from_str(
            r#"
mode = "date_range"
date_from = "7 days ago"
"#,
        )
        .unwrap();
        assert_eq!(
            window,
            WindowConfig::DateRange {
                date_from: "7 days ago".to_string(),
                date_to: "now".to_string(),
            }
        );

        let window: WindowConfig = toml::from_str(
            r#"
mode = "field_lower_bound"
field = "modified_after"
value = "2024-03-01T00:00:00"
"#,
        )
        .unwrap();
        assert!(matches!(window, WindowConfig::FieldLowerBound { .. }));
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }
}
