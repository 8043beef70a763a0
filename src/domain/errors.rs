//! Domain error types
//!
//! This module defines the error hierarchy for Strata. Errors are split by how
//! far they propagate:
//!
//! - [`FetchError`] covers the HTTP source. After the retry policy gives up, these
//!   abort the whole run.
//! - [`RecordError`] covers a single malformed record. These are logged and the
//!   record is skipped, extraction of the endpoint continues.
//! - [`StrataError`] is the top-level type returned by every fallible operation.
//!
//! None of the variants expose third-party types.

use thiserror::Error;

/// Main Strata error type
#[derive(Debug, Error)]
pub enum StrataError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Errors raised while talking to the store API
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A single record could not be decomposed
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Parent/child linkage could not be established consistently
    #[error("Linkage error: {0}")]
    Linkage(String),

    /// Table output errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Run state errors
    #[error("State management error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl StrataError {
    /// Returns true if this error only affects the record being processed
    pub fn is_record_local(&self) -> bool {
        matches!(self, StrataError::Record(_))
    }
}

/// Store API errors
///
/// Each variant maps to one class of the retry policy: authentication and other
/// client errors are never retried, rate limits are retried on the server's hint,
/// server and connectivity errors are retried with exponential backoff.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP 401
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// DNS, TLS, refused connections and timeouts
    #[error("Failed to connect to store: {0}")]
    Connectivity(String),

    /// HTTP 429
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: f64 },

    /// HTTP 5xx
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// Any other HTTP 4xx
    #[error("Client error: {status} - {message}")]
    Client { status: u16, message: String },

    /// The response could not be interpreted
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Retryable failures persisted past the attempt limit
    #[error("Giving up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<FetchError> },
}

impl FetchError {
    /// Returns true if the retry policy may try the request again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Connectivity(_) | FetchError::RateLimited { .. } | FetchError::Server { .. }
        )
    }

    /// Returns true if the error was raised because of the credentials
    pub fn is_authentication(&self) -> bool {
        match self {
            FetchError::Authentication(_) => true,
            FetchError::RetriesExhausted { last, .. } => last.is_authentication(),
            _ => false,
        }
    }
}

/// Errors local to a single record
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The identifier the decomposition depends on is absent
    #[error("{table}: missing identifier field '{field}'")]
    MissingIdentifier { table: String, field: String },

    /// The identifier is present but is not a scalar
    #[error("{table}: identifier field '{field}' is not a scalar")]
    InvalidIdentifier { table: String, field: String },

    /// The record (or a nested element) is not a JSON object
    #[error("{table}: expected an object")]
    NotAnObject { table: String },

    /// A field declared as a nested collection holds something other than an array
    #[error("{table}: nested field '{field}' is not an array")]
    NestedNotArray { table: String, field: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for StrataError {
    fn from(err: std::io::Error) -> Self {
        StrataError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for StrataError {
    fn from(err: serde_json::Error) -> Self {
        StrataError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for StrataError {
    fn from(err: toml::de::Error) -> Self {
        StrataError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv writer errors
impl From<csv::Error> for StrataError {
    fn from(err: csv::Error) -> Self {
        StrataError::Storage(format!("CSV error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strata_error_display() {
        let err = StrataError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_fetch_error_conversion() {
        let fetch_err = FetchError::Connectivity("Network error".to_string());
        let err: StrataError = fetch_err.into();
        assert!(matches!(err, StrataError::Fetch(_)));
        assert!(!err.is_record_local());
    }

    #[test]
    fn test_record_error_is_local() {
        let err: StrataError = RecordError::MissingIdentifier {
            table: "order".to_string(),
            field: "id".to_string(),
        }
        .into();
        assert!(err.is_record_local());
        assert_eq!(
            err.to_string(),
            "Record error: order: missing identifier field 'id'"
        );
    }

    #[test]
    fn test_fetch_error_retryable() {
        assert!(FetchError::Connectivity("refused".to_string()).is_retryable());
        assert!(FetchError::RateLimited {
            retry_after_secs: 1.0
        }
        .is_retryable());
        assert!(FetchError::Server {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!FetchError::Authentication("bad key".to_string()).is_retryable());
        assert!(!FetchError::Client {
            status: 404,
            message: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn test_retries_exhausted_keeps_last_error() {
        let err = FetchError::RetriesExhausted {
            attempts: 5,
            last: Box::new(FetchError::Server {
                status: 500,
                message: "boom".to_string(),
            }),
        };
        assert_eq!(
            err.to_string(),
            "Giving up after 5 attempts: Server error: 500 - boom"
        );
        assert!(!err.is_authentication());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: StrataError = io_err.into();
        assert!(matches!(err, StrataError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: StrataError = json_err.into();
        assert!(matches!(err, StrataError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: StrataError = toml_err.into();
        assert!(matches!(err, StrataError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
