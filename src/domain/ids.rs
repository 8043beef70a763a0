//! Domain identifier types with validation
//!
//! This module provides the endpoint selector and the table name newtype used
//! to key output tables, manifests and persisted run state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A store endpoint that can be extracted
///
/// Parsing is case-insensitive, so `"Orders"` and `"orders"` both select
/// [`Endpoint::Orders`].
///
/// # Examples
///
/// ```
/// use strata::domain::ids::Endpoint;
/// use std::str::FromStr;
///
/// let endpoint = Endpoint::from_str("Orders").unwrap();
/// assert_eq!(endpoint, Endpoint::Orders);
/// assert_eq!(endpoint.path(), "orders");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// `/orders`
    Orders,
    /// `/products`
    Products,
    /// `/customers`
    Customers,
}

impl Endpoint {
    /// All endpoints in their default extraction order
    pub const ALL: [Endpoint; 3] = [Endpoint::Orders, Endpoint::Products, Endpoint::Customers];

    /// Path segment of the endpoint below the API root
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Orders => "orders",
            Endpoint::Products => "products",
            Endpoint::Customers => "customers",
        }
    }

    /// Whether the endpoint accepts `after`/`before` date filters and `status=any`
    ///
    /// The customers endpoint ignores both, so windows are never sent to it.
    pub fn supports_date_filter(&self) -> bool {
        !matches!(self, Endpoint::Customers)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "orders" => Ok(Endpoint::Orders),
            "products" => Ok(Endpoint::Products),
            "customers" => Ok(Endpoint::Customers),
            other => Err(format!(
                "Unknown endpoint '{other}'. Must be one of: orders, products, customers"
            )),
        }
    }
}

/// Output table name newtype wrapper
///
/// Table names are lowercase and built by joining the parent table name and
/// the nested field name with `_`, e.g. `order_line_items_taxes`.
///
/// # Examples
///
/// ```
/// use strata::domain::ids::TableName;
///
/// let root = TableName::new("order").unwrap();
/// let child = root.child("line_items");
/// assert_eq!(child.as_str(), "order_line_items");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableName(String);

impl TableName {
    /// Creates a new TableName
    ///
    /// # Returns
    ///
    /// Returns `Err` if the name is empty or contains a path separator
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Table name cannot be empty".to_string());
        }
        if name.contains(['/', '\\']) {
            return Err(format!("Table name '{name}' cannot contain path separators"));
        }
        Ok(Self(name))
    }

    /// Table name from a compile-time constant
    pub(crate) fn from_static(name: &'static str) -> Self {
        Self(name.to_string())
    }

    /// Name of the child table holding the elements of `field`
    pub fn child(&self, field: &str) -> TableName {
        TableName(format!("{}_{}", self.0, field))
    }

    /// Returns the table name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TableName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_parse_case_insensitive() {
        assert_eq!(Endpoint::from_str("ORDERS").unwrap(), Endpoint::Orders);
        assert_eq!(Endpoint::from_str(" products ").unwrap(), Endpoint::Products);
        assert_eq!(Endpoint::from_str("Customers").unwrap(), Endpoint::Customers);
        assert!(Endpoint::from_str("coupons").is_err());
    }

    #[test]
    fn test_endpoint_date_filter_support() {
        assert!(Endpoint::Orders.supports_date_filter());
        assert!(Endpoint::Products.supports_date_filter());
        assert!(!Endpoint::Customers.supports_date_filter());
    }

    #[test]
    fn test_table_name_child() {
        let table = TableName::new("order").unwrap();
        assert_eq!(
            table.child("line_items").child("taxes").as_str(),
            "order_line_items_taxes"
        );
    }

    #[test]
    fn test_table_name_validation() {
        assert!(TableName::new("").is_err());
        assert!(TableName::new("  ").is_err());
        assert!(TableName::new("../order").is_err());
    }
}
