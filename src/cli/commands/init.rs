//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "strata.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Strata configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your store URL", self.output);
                println!("  2. Create a .env file with your credentials:");
                println!("     - Set WOOCOMMERCE_CONSUMER_KEY and WOOCOMMERCE_CONSUMER_SECRET");
                println!("  3. Validate configuration: strata validate-config");
                println!("  4. Run extraction: strata extract");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Strata Configuration File
# WooCommerce to relational tables extractor

[application]
log_level = "info"
data_dir = "data"

[store]
url = "https://shop.example.com"
consumer_key = "${WOOCOMMERCE_CONSUMER_KEY}"
consumer_secret = "${WOOCOMMERCE_CONSUMER_SECRET}"

[extraction]
endpoints = ["orders", "products", "customers"]
page_size = 100
load_type = "incremental"

[extraction.window]
mode = "date_range"
date_from = "7 days ago"
date_to = "now"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Strata Configuration File
# WooCommerce to relational tables extractor
#
# This file contains all configuration options with examples and explanations.
# Every value can be overridden with STRATA_<SECTION>_<KEY> environment
# variables, e.g. STRATA_STORE_URL or STRATA_EXTRACTION_PAGE_SIZE.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Root folder: state is read from in/state.json, tables are written to
# out/tables/ and the next state to out/state.json
data_dir = "data"

# ============================================================================
# Store Connection
# ============================================================================
[store]
# Base URL of the WordPress site
url = "https://shop.example.com"

# REST API credentials (use environment variables)
consumer_key = "${WOOCOMMERCE_CONSUMER_KEY}"
consumer_secret = "${WOOCOMMERCE_CONSUMER_SECRET}"

# REST API namespace
api_version = "wc/v3"

# Send the credentials as query parameters instead of Basic authentication
# (for servers that strip the Authorization header)
query_string_auth = false

# Request timeout in seconds
timeout_seconds = 60

# Verify TLS certificates
tls_verify = true

[store.retry]
# Attempts for 5xx and connection errors (429 responses do not count)
max_attempts = 5
initial_delay_ms = 1000
max_delay_ms = 60000
backoff_multiplier = 2.0

# A 429 waits Retry-After times this multiplier
rate_limit_multiplier = 2.0

# ============================================================================
# Extraction
# ============================================================================
[extraction]
# Endpoints in extraction order: orders, products, customers
endpoints = ["orders", "products", "customers"]

# Records per page (1-100)
page_size = 100

# Load type declared in the manifests: incremental (merge by primary key) | full
load_type = "incremental"

# Split meta_data arrays into child tables; when false they stay on the
# parent row as JSON text
flatten_meta_data = true

# Fetch window, one of:
#   mode = "all"
#   mode = "date_range", date_from, date_to
#   mode = "field_lower_bound", field, value
# Dates accept ISO dates/datetimes or now, today, yesterday, "N days ago",
# "N hours ago", "N minutes ago", "N weeks ago".
# The customers endpoint ignores date windows.
[extraction.window]
mode = "date_range"
date_from = "7 days ago"
date_to = "now"

# ============================================================================
# Logging
# ============================================================================
[logging]
# Also write JSON log lines to a rotating file
local_enabled = false
local_path = "logs"

# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrataConfig;
    use tempfile::TempDir;

    #[test]
    fn test_generated_configs_parse() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let substituted = content
                .replace("${WOOCOMMERCE_CONSUMER_KEY}", "ck")
                .replace("${WOOCOMMERCE_CONSUMER_SECRET}", "cs");
            let config: StrataConfig = toml::from_str(&substituted).unwrap();
            config.validate().unwrap();
        }
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("strata.toml");
        std::fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "existing");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(std::fs::read_to_string(&output).unwrap().contains("[store]"));
    }
}
