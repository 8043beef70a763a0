//! Scalar-row flattening
//!
//! Turns the scalar part of one JSON object into [`Row`] cells:
//! - nested objects become prefixed columns: `{"billing": {"city": "Oslo"}}` →
//!   `billing__city = "Oslo"`
//! - arrays that are not decomposed into child tables are kept as compact JSON text
//! - `null` becomes an empty cell, numbers and booleans their JSON text

use crate::domain::Row;
use serde_json::{Map, Value};

/// Separator between a parent object key and a nested key
pub const NESTED_SEPARATOR: &str = "__";

/// Flatten every field of `object` into `row`, in source order
///
/// # Examples
///
/// ```
/// use strata::core::transform::flatten_object;
/// use strata::domain::Row;
/// use serde_json::json;
///
/// let value = json!({"id": 7, "billing": {"city": "Oslo"}, "paid": true});
/// let mut row = Row::new();
/// flatten_object(value.as_object().unwrap(), &mut row);
///
/// assert_eq!(row.get("id"), Some("7"));
/// assert_eq!(row.get("billing__city"), Some("Oslo"));
/// assert_eq!(row.get("paid"), Some("true"));
/// ```
pub fn flatten_object(object: &Map<String, Value>, row: &mut Row) {
    flatten_into(object, "", row);
}

fn flatten_into(object: &Map<String, Value>, prefix: &str, row: &mut Row) {
    for (key, value) in object {
        let column = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}{NESTED_SEPARATOR}{key}")
        };

        match value {
            Value::Object(nested) => flatten_into(nested, &column, row),
            other => row.insert(column, cell_value(other)),
        }
    }
}

/// Render one JSON value as cell text
pub fn cell_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // arrays and objects reaching here are kept verbatim
        other => other.to_string(),
    }
}
