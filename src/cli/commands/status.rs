//! Status command implementation
//!
//! This module implements the `status` command for displaying the persisted
//! column layout of every table.

use crate::adapters::storage::{DataLayout, JsonStateStore, StateStore};
use crate::config::load_config;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only show tables whose name starts with this prefix
    #[arg(long)]
    pub table: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking extraction status");

        println!("📊 Extraction Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        // the state written by the last run wins over the one it started from
        let layout = DataLayout::new(&config.application.data_dir);
        let path = if layout.output_state().exists() {
            layout.output_state()
        } else {
            layout.input_state()
        };
        let store = JsonStateStore::new(&path, &path);

        let state = match store.load().await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to load state");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        if state.is_empty() {
            println!("No extraction history found.");
            println!("Run 'strata extract' to start extracting data.");
            return Ok(0);
        }

        let tables: Vec<&str> = state
            .tables()
            .filter(|t| self.table.as_deref().map_or(true, |p| t.starts_with(p)))
            .collect();

        if tables.is_empty() {
            println!("No tables match the specified filter.");
            return Ok(0);
        }

        println!("State: {}", path.display());
        println!("Found {} table(s):", tables.len());
        println!();
        println!("{:<40} {:<8} Columns", "Table", "Count");
        println!("{}", "-".repeat(100));

        for table in tables {
            let columns = state.columns(table).unwrap_or_default();
            println!("{:<40} {:<8} {}", table, columns.len(), columns.join(", "));
        }
        println!();

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[tokio::test]
    async fn test_status_reads_output_state() {
        let data = TempDir::new().unwrap();
        let out = data.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("state.json"), r#"{"order": ["id", "status"]}"#).unwrap();

        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[application]
data_dir = "{}"

[store]
url = "https://shop.example.com"
consumer_key = "ck_test"
consumer_secret = "cs_test"
"#,
            data.path().display()
        )
        .unwrap();

        let args = StatusArgs {
            table: Some("order".to_string()),
        };
        let code = args.execute(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_status_missing_config() {
        let args = StatusArgs { table: None };
        let code = args.execute("/nonexistent/strata.toml").await.unwrap();
        assert_eq!(code, 2);
    }
}
