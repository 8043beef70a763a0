//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Strata configuration file.

use crate::config::{load_config, WindowConfig};
use crate::core::extract::resolve_window;
use crate::core::transform::catalog::{table_names, CatalogOptions};
use chrono::Local;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also list every table the configured endpoints can produce
    #[arg(long)]
    pub tables: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as well
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let filter = match resolve_window(&config.extraction.window, Local::now().naive_local()) {
            Ok(f) => f,
            Err(e) => {
                println!("❌ Fetch window cannot be resolved");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let endpoints = match config.extraction.endpoints() {
            Ok(e) => e,
            Err(e) => {
                println!("❌ {e}");
                return Ok(2);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Data Directory: {}", config.application.data_dir.display());
        println!("  Store: {}", config.store.url);
        println!("  API Version: {}", config.store.api_version);
        println!(
            "  Authentication: {}",
            if config.store.query_string_auth {
                "query string"
            } else {
                "basic"
            }
        );
        println!(
            "  Endpoints: {}",
            endpoints
                .iter()
                .map(|e| e.path())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  Page Size: {}", config.extraction.page_size);
        println!("  Load Type: {:?}", config.extraction.load_type);
        println!("  Flatten meta_data: {}", config.extraction.flatten_meta_data);
        match &config.extraction.window {
            WindowConfig::All => println!("  Window: all records"),
            WindowConfig::DateRange { date_from, date_to } => {
                println!("  Window: {date_from} .. {date_to} (resolved: {filter:?})")
            }
            WindowConfig::FieldLowerBound { field, value } => {
                println!("  Window: {field} >= {value}")
            }
        }

        if self.tables {
            let options = CatalogOptions {
                flatten_meta_data: config.extraction.flatten_meta_data,
            };
            println!();
            println!("Tables:");
            for endpoint in &endpoints {
                for table in table_names(*endpoint, options) {
                    println!("  {table}");
                }
            }
        }
        println!();

        Ok(0)
    }
}
