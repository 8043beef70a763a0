//! Extract command implementation
//!
//! This module implements the `extract` command, which pulls the configured
//! endpoints from the store and writes the decomposed tables.

use crate::config::{load_config, LoadType, StrataConfig, WindowConfig};
use crate::core::extract::ExtractCoordinator;
use crate::domain::StrataError;
use clap::Args;

/// Arguments for the extract command
#[derive(Args, Debug, Default)]
pub struct ExtractArgs {
    /// Override endpoint(s) to extract (comma-separated)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Override the lower date bound (ISO date or e.g. "7 days ago")
    #[arg(long)]
    pub date_from: Option<String>,

    /// Override the upper date bound (defaults to "now")
    #[arg(long)]
    pub date_to: Option<String>,

    /// Override the page size (1-100)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Override the load type (incremental or full)
    #[arg(long)]
    pub load_type: Option<String>,
}

impl ExtractArgs {
    /// Execute the extract command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting extract command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Err(e) = self.apply_overrides(&mut config) {
            tracing::error!(error = %e, "Invalid command line override");
            eprintln!("Invalid option: {e}");
            return Ok(2);
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        tracing::info!("Connecting to store");
        let coordinator = match ExtractCoordinator::new(config).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open store session");
                eprintln!("Failed to initialize extraction: {e}");
                return Ok(match e {
                    StrataError::Configuration(_) => 2,
                    StrataError::Fetch(_) => 4,
                    _ => 5,
                });
            }
        };

        println!("🚀 Starting extraction...");
        println!();

        let summary = match coordinator.execute().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Extraction failed");
                eprintln!("Extraction failed: {e}");
                return Ok(match e {
                    StrataError::Configuration(_) => 2,
                    _ => 5,
                });
            }
        };

        println!("📊 Extraction Summary:");
        println!("  Run: {}", summary.run_id);
        for endpoint in &summary.endpoints {
            println!(
                "  {:<10} pages: {:<5} records: {:<8} skipped: {}",
                endpoint.endpoint.path(),
                endpoint.pages,
                endpoint.records_written,
                endpoint.records_skipped
            );
        }
        println!("  Tables: {}", summary.tables.len());
        println!("  Rows: {}", summary.rows_written());
        println!("  Output: {}", coordinator.layout().tables_dir().display());
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        if summary.is_successful() {
            println!("✅ Extraction completed successfully!");
            Ok(0)
        } else {
            println!(
                "⚠️  Extraction completed with {} skipped record(s)",
                summary.records_skipped()
            );
            Ok(1)
        }
    }

    /// Apply the command line overrides to a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if `--date-to` is given without a lower bound or the
    /// load type is unknown.
    pub fn apply_overrides(&self, config: &mut StrataConfig) -> Result<(), String> {
        if let Some(endpoints) = &self.endpoint {
            let endpoints: Vec<String> = endpoints
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            tracing::info!(endpoints = ?endpoints, "Overriding endpoints from CLI");
            config.extraction.endpoints = endpoints;
        }

        if let Some(page_size) = self.page_size {
            tracing::info!(page_size, "Overriding page size from CLI");
            config.extraction.page_size = page_size;
        }

        if let Some(load_type) = &self.load_type {
            config.extraction.load_type = match load_type.trim().to_lowercase().as_str() {
                "incremental" => LoadType::Incremental,
                "full" => LoadType::Full,
                other => {
                    return Err(format!(
                        "Unknown load type '{other}'. Must be 'incremental' or 'full'"
                    ))
                }
            };
        }

        let date_from = match (&self.date_from, &config.extraction.window) {
            (Some(from), _) => Some(from.clone()),
            (None, WindowConfig::DateRange { date_from, .. }) if self.date_to.is_some() => {
                Some(date_from.clone())
            }
            (None, _) if self.date_to.is_some() => {
                return Err("--date-to requires --date-from".to_string())
            }
            (None, _) => None,
        };

        if let Some(date_from) = date_from {
            let date_to = self.date_to.clone().unwrap_or_else(|| "now".to_string());
            tracing::info!(date_from = %date_from, date_to = %date_to, "Overriding window from CLI");
            config.extraction.window = WindowConfig::DateRange { date_from, date_to };
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        secret_string, ApplicationConfig, ExtractionConfig, LoggingConfig, RetryConfig,
        StoreConfig,
    };

    fn config() -> StrataConfig {
        StrataConfig {
            application: ApplicationConfig::default(),
            store: StoreConfig {
                url: "https://shop.example.com".to_string(),
                consumer_key: secret_string("ck".to_string()),
                consumer_secret: secret_string("cs".to_string()),
                api_version: "wc/v3".to_string(),
                query_string_auth: false,
                timeout_seconds: 60,
                tls_verify: true,
                retry: RetryConfig::default(),
            },
            extraction: ExtractionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut cfg = config();
        ExtractArgs::default().apply_overrides(&mut cfg).unwrap();
        assert_eq!(cfg.extraction.window, WindowConfig::All);
        assert_eq!(cfg.extraction.page_size, 100);
    }

    #[test]
    fn test_endpoint_and_page_size_overrides() {
        let mut cfg = config();
        let args = ExtractArgs {
            endpoint: Some("orders, customers,".to_string()),
            page_size: Some(25),
            load_type: Some("FULL".to_string()),
            ..Default::default()
        };
        args.apply_overrides(&mut cfg).unwrap();

        assert_eq!(cfg.extraction.endpoints, vec!["orders", "customers"]);
        assert_eq!(cfg.extraction.page_size, 25);
        assert_eq!(cfg.extraction.load_type, LoadType::Full);
    }

    #[test]
    fn test_date_from_defaults_upper_bound_to_now() {
        let mut cfg = config();
        let args = ExtractArgs {
            date_from: Some("7 days ago".to_string()),
            ..Default::default()
        };
        args.apply_overrides(&mut cfg).unwrap();

        assert_eq!(
            cfg.extraction.window,
            WindowConfig::DateRange {
                date_from: "7 days ago".to_string(),
                date_to: "now".to_string(),
            }
        );
    }

    #[test]
    fn test_date_to_alone() {
        let args = ExtractArgs {
            date_to: Some("yesterday".to_string()),
            ..Default::default()
        };

        let mut cfg = config();
        assert!(args.apply_overrides(&mut cfg).is_err());

        let mut cfg = config();
        cfg.extraction.window = WindowConfig::DateRange {
            date_from: "2024-01-01".to_string(),
            date_to: "now".to_string(),
        };
        args.apply_overrides(&mut cfg).unwrap();
        assert_eq!(
            cfg.extraction.window,
            WindowConfig::DateRange {
                date_from: "2024-01-01".to_string(),
                date_to: "yesterday".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_load_type() {
        let mut cfg = config();
        let args = ExtractArgs {
            load_type: Some("merge".to_string()),
            ..Default::default()
        };
        assert!(args.apply_overrides(&mut cfg).is_err());
    }
}
