//! Rows, linkage keys and table descriptors
//!
//! A [`Row`] is one flattened output line: an ordered map from column name to
//! cell text. [`Linkage`] is the list of key columns a child row inherits from
//! its ancestors. [`TableDescriptor`] is what a finished table reports upward.

use super::ids::TableName;
use serde::{Deserialize, Serialize};

/// One flattened output row, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    /// Creates an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a cell, replacing the value if the column already exists
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Returns the value of a cell
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Column names in insertion order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Key columns inherited from ancestor entities
///
/// Each entry is `(column, value)`, outermost ancestor first. A child row
/// carries every entry of its parent's linkage plus the parent's own key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Linkage {
    keys: Vec<(String, String)>,
}

impl Linkage {
    /// Linkage of a root entity
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new linkage extended with one more key column
    pub fn with(&self, column: impl Into<String>, value: impl Into<String>) -> Self {
        let mut keys = self.keys.clone();
        keys.push((column.into(), value.into()));
        Self { keys }
    }

    /// The key entries, outermost ancestor first
    pub fn keys(&self) -> &[(String, String)] {
        &self.keys
    }

    /// Column names of the key entries
    pub fn columns(&self) -> Vec<String> {
        self.keys.iter().map(|(c, _)| c.clone()).collect()
    }

    /// Returns true if no ancestor keys are present
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Final description of a produced table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name
    pub name: TableName,

    /// Primary-key columns
    pub primary_key: Vec<String>,

    /// Column list in first-seen order
    pub columns: Vec<String>,

    /// Number of rows written during this run
    #[serde(default)]
    pub rows_written: usize,
}
