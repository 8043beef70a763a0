//! Decomposition schemas of the store entities

use super::schema::EntitySchema;
use crate::domain::ids::{Endpoint, TableName};

/// Meta-data field present on most entities
pub const META_DATA_FIELD: &str = "meta_data";

/// Options that change the shape of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Decompose `meta_data` arrays into child tables
    pub flatten_meta_data: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            flatten_meta_data: true,
        }
    }
}

/// Root table of an endpoint
pub fn root_table(endpoint: Endpoint) -> TableName {
    let name = match endpoint {
        Endpoint::Orders => "order",
        Endpoint::Products => "product",
        Endpoint::Customers => "customer",
    };
    TableName::from_static(name)
}

/// Decomposition schema of an endpoint's records
pub fn entity_schema(endpoint: Endpoint, options: CatalogOptions) -> EntitySchema {
    let schema = match endpoint {
        Endpoint::Orders => order_schema(),
        Endpoint::Products => product_schema(),
        Endpoint::Customers => customer_schema(),
    };

    if options.flatten_meta_data {
        schema
    } else {
        schema.without_child(META_DATA_FIELD)
    }
}

fn meta_data() -> EntitySchema {
    EntitySchema::ordinal("meta_data")
}

fn order_schema() -> EntitySchema {
    EntitySchema::identified("order")
        .exclude(["customer_user_agent"])
        .child(
            "line_items",
            EntitySchema::identified("line_item")
                .child("taxes", EntitySchema::ordinal("tax"))
                .child(META_DATA_FIELD, meta_data()),
        )
        .child(
            "tax_lines",
            EntitySchema::identified("tax_line").child(META_DATA_FIELD, meta_data()),
        )
        .child(
            "shipping_lines",
            EntitySchema::identified("shipping_line")
                .child("taxes", EntitySchema::ordinal("tax"))
                .child(META_DATA_FIELD, meta_data()),
        )
        .child(META_DATA_FIELD, meta_data())
        .child(
            "coupon_lines",
            EntitySchema::identified("coupon_line").child(META_DATA_FIELD, meta_data()),
        )
        .child(
            "fee_lines",
            EntitySchema::identified("fee_line")
                .child("taxes", EntitySchema::ordinal("tax"))
                .child(META_DATA_FIELD, meta_data()),
        )
        .child("refunds", EntitySchema::identified("refund"))
}

fn product_schema() -> EntitySchema {
    EntitySchema::identified("product")
        .exclude(["downloads"])
        .child("categories", EntitySchema::identified("category"))
        .child("images", EntitySchema::identified("image"))
        .child("attributes", EntitySchema::identified("attribute"))
        .child("default_attributes", EntitySchema::ordinal("default_attribute"))
        .child("tags", EntitySchema::identified("tag"))
        .child(META_DATA_FIELD, meta_data())
}

fn customer_schema() -> EntitySchema {
    EntitySchema::identified("customer").child(META_DATA_FIELD, meta_data())
}

/// Every table an endpoint can produce, parents before children
pub fn table_names(endpoint: Endpoint, options: CatalogOptions) -> Vec<TableName> {
    fn collect(table: TableName, schema: &EntitySchema, out: &mut Vec<TableName>) {
        out.push(table.clone());
        for child in schema.children() {
            collect(table.child(&child.field), &child.schema, out);
        }
    }

    let mut names = Vec::new();
    collect(root_table(endpoint), &entity_schema(endpoint, options), &mut names);
    names
}
