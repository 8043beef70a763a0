//! Extraction orchestration
//!
//! - [`coordinator`] - drives endpoints, writers, manifests and state
//! - [`summary`] - per-run counters
//! - [`window`] - fetch window resolution

pub mod coordinator;
pub mod summary;
pub mod window;

pub use coordinator::{ExtractCoordinator, EXTRACTION_TIME_FORMAT};
pub use summary::{EndpointSummary, ExtractSummary};
pub use window::{parse_date_bound, resolve_window};
