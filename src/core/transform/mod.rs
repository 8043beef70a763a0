//! Record transformation
//!
//! - [`schema`] - declarative decomposition schemas
//! - [`catalog`] - the schemas of orders, products and customers
//! - [`flatten`] - turning the scalar part of an object into row cells

pub mod catalog;
pub mod flatten;
pub mod schema;

pub use catalog::{entity_schema, root_table, CatalogOptions};
pub use flatten::{cell_value, flatten_object, NESTED_SEPARATOR};
pub use schema::{EntitySchema, NestedField, ID_FIELD, ROW_NR_COLUMN};
