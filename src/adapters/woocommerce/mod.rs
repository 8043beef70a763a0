//! WooCommerce REST API integration
//!
//! - [`client`] - authenticated HTTP client and status classification
//! - [`pagination`] - pull-based page iteration
//! - [`query`] - list query parameters and fetch filters
//! - [`retry`] - retry policy value object

pub mod client;
pub mod pagination;
pub mod query;
pub mod retry;

pub use client::WooCommerceClient;
pub use pagination::{Page, Paginator};
pub use query::FetchFilter;
pub use retry::{RetryAction, RetryPolicy};
