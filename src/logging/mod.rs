//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with configurable levels
//! - JSON-formatted local file logging with rotation
//! - Shared macros for the events every extraction run emits
//!
//! # Example
//!
//! ```no_run
//! use strata::logging::init_logging;
//! use strata::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(endpoint = "orders", "Extraction started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use strata::log_retry_attempt;
///
/// log_retry_attempt!(2, 5, 2000u64, "Server error: 503");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying request"
        );
    };
}

/// Log a fetched page
///
/// # Example
///
/// ```no_run
/// use strata::log_page_fetched;
///
/// log_page_fetched!("orders", 1, 3, 100);
/// ```
#[macro_export]
macro_rules! log_page_fetched {
    ($endpoint:expr, $page:expr, $total_pages:expr, $records:expr) => {
        tracing::debug!(
            endpoint = %$endpoint,
            page = $page,
            total_pages = $total_pages,
            records = $records,
            "Fetched page"
        );
    };
}

/// Log a record that was skipped because it could not be decomposed
///
/// # Example
///
/// ```no_run
/// use strata::log_record_skipped;
///
/// log_record_skipped!("orders", "unknown", "order: missing identifier field 'id'");
/// ```
#[macro_export]
macro_rules! log_record_skipped {
    ($endpoint:expr, $entity_id:expr, $error:expr) => {
        tracing::warn!(
            endpoint = %$endpoint,
            entity_id = %$entity_id,
            error = %$error,
            "Skipping record"
        );
    };
}
