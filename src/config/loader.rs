//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{LoadType, StrataConfig};
use super::secret::secret_string;
use crate::domain::errors::StrataError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into StrataConfig
/// 4. Applies environment variable overrides (STRATA_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns [`StrataError::Configuration`] if the file is missing or unreadable,
/// a referenced environment variable is unset, the TOML is malformed, or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use strata::config::loader::load_config;
///
/// let config = load_config("strata.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<StrataConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StrataError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        StrataError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: StrataConfig = toml::from_str(&contents)
        .map_err(|e| StrataError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        StrataError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| StrataError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(StrataError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using STRATA_* prefix
///
/// Environment variables follow the pattern: STRATA_<SECTION>_<KEY>,
/// for example STRATA_STORE_URL or STRATA_EXTRACTION_PAGE_SIZE.
fn apply_env_overrides(config: &mut StrataConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("STRATA_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("STRATA_APPLICATION_DATA_DIR") {
        config.application.data_dir = PathBuf::from(val);
    }

    // Store overrides
    if let Ok(val) = std::env::var("STRATA_STORE_URL") {
        config.store.url = val;
    }
    if let Ok(val) = std::env::var("STRATA_STORE_CONSUMER_KEY") {
        config.store.consumer_key = secret_string(val);
    }
    if let Ok(val) = std::env::var("STRATA_STORE_CONSUMER_SECRET") {
        config.store.consumer_secret = secret_string(val);
    }
    if let Ok(val) = std::env::var("STRATA_STORE_API_VERSION") {
        config.store.api_version = val;
    }
    if let Ok(val) = std::env::var("STRATA_STORE_QUERY_STRING_AUTH") {
        config.store.query_string_auth = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("STRATA_STORE_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.store.timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("STRATA_STORE_TLS_VERIFY") {
        config.store.tls_verify = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("STRATA_STORE_RETRY_MAX_ATTEMPTS") {
        if let Ok(attempts) = val.parse() {
            config.store.retry.max_attempts = attempts;
        }
    }

    // Extraction overrides
    if let Ok(val) = std::env::var("STRATA_EXTRACTION_ENDPOINTS") {
        config.extraction.endpoints = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Ok(val) = std::env::var("STRATA_EXTRACTION_PAGE_SIZE") {
        if let Ok(size) = val.parse() {
            config.extraction.page_size = size;
        }
    }
    if let Ok(val) = std::env::var("STRATA_EXTRACTION_LOAD_TYPE") {
        config.extraction.load_type = match val.to_lowercase().as_str() {
            "full" => LoadType::Full,
            "incremental" => LoadType::Incremental,
            other => {
                return Err(StrataError::Configuration(format!(
                    "Invalid STRATA_EXTRACTION_LOAD_TYPE '{other}'. Must be one of: incremental, full"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("STRATA_EXTRACTION_FLATTEN_META_DATA") {
        config.extraction.flatten_meta_data = val.parse().unwrap_or(true);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("STRATA_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("STRATA_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
