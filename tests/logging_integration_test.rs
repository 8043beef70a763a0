//! Integration tests for logging functionality

use strata::config::LoggingConfig;
use strata::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
    assert_eq!(config.local_path, "logs");
}

#[test]
fn test_file_logging_writes_json_lines() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("debug", &config).unwrap();
    // the default filter only passes the library's own targets
    tracing::info!(target: "strata::extract", endpoint = "orders", "Extraction started");
    tracing::info!(target: "other_crate", "Filtered out");
    drop(guard);

    let contents = std::fs::read_to_string(log_path.join("strata.log")).unwrap();
    assert!(contents.contains("Logging initialized"));
    assert!(contents.contains("Extraction started"));
    assert!(!contents.contains("Filtered out"));
    for line in contents.lines() {
        serde_json::from_str::<serde_json::Value>(line).unwrap();
    }

    // the global subscriber can only be installed once per process
    assert!(init_logging("info", &LoggingConfig::console_only()).is_err());
}

#[test]
fn test_logging_macros_usage() {
    strata::log_retry_attempt!(1, 5, 1000u64, "HTTP 503");
    strata::log_page_fetched!("customers", 1, 1, 3);
    strata::log_record_skipped!("products", "42", "product_categories: missing identifier field 'id'");
}
