//! Persisted column layout of every table
//!
//! The run state maps each table name to its column list. It is read when a
//! run starts so that column order stays stable across runs, and written when
//! the run ends with the columns observed during the run appended.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Table name → column list
///
/// Serialized as a plain JSON object:
///
/// ```json
/// { "order": ["id", "status", "extraction_time"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunState {
    tables: BTreeMap<String, Vec<String>>,
}

impl RunState {
    /// Column list of `table`, if known
    pub fn columns(&self, table: &str) -> Option<&[String]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    /// Replace the column list of `table`
    pub fn set_columns(&mut self, table: impl Into<String>, columns: Vec<String>) {
        self.tables.insert(table.into(), columns);
    }

    /// Append the columns of `table` not already known, keeping existing order
    pub fn merge_columns<I, S>(&mut self, table: &str, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let known = self.tables.entry(table.to_string()).or_default();
        for column in columns {
            let column = column.into();
            if !known.contains(&column) {
                known.push(column);
            }
        }
    }

    /// Table names in alphabetical order
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if no table is recorded
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_appends_only_new_columns() {
        let mut state = RunState::default();
        state.set_columns("order", vec!["id".into(), "status".into()]);
        state.merge_columns("order", ["status", "total", "id"]);

        assert_eq!(
            state.columns("order").unwrap(),
            ["id", "status", "total"]
        );
    }

    #[test]
    fn test_merge_creates_unknown_table() {
        let mut state = RunState::default();
        state.merge_columns("customer", ["id"]);
        assert_eq!(state.columns("customer").unwrap(), ["id"]);
        assert!(state.columns("product").is_none());
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let mut state = RunState::default();
        state.set_columns("order", vec!["id".into()]);

        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"order":["id"]}"#);

        let back: RunState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
