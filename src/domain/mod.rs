//! Domain models and types for Strata.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Identifiers** ([`Endpoint`], [`TableName`])
//! - **Row model** ([`Row`], [`Linkage`], [`TableDescriptor`])
//! - **Error types** ([`StrataError`], [`FetchError`], [`RecordError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, StrataError>`]:
//!
//! ```rust,no_run
//! use strata::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = strata::config::load_config("strata.toml")?;
//!     println!("{}", config.store.url);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{FetchError, RecordError, StrataError};
pub use ids::{Endpoint, TableName};
pub use record::{Linkage, Row, TableDescriptor};
pub use result::Result;
