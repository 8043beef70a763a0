//! Evolving column lists
//!
//! A [`ColumnSet`] records columns in first-seen order. Columns are only ever
//! appended, so values already written keep their position. A set can be
//! seeded with the previous run's list to keep the layout stable across runs.

use crate::domain::Row;
use std::collections::HashMap;

/// Ordered, append-only set of column names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ColumnSet {
    /// Empty column set
    pub fn new() -> Self {
        Self::default()
    }

    /// Column set starting with `columns`, duplicates dropped
    pub fn seeded<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for column in columns {
            set.push(column.into());
        }
        set
    }

    /// Append the columns of `row` not seen before
    ///
    /// # Returns
    ///
    /// The number of appended columns
    pub fn observe(&mut self, row: &Row) -> usize {
        let before = self.names.len();
        for column in row.columns() {
            if !self.positions.contains_key(column) {
                self.push(column.to_string());
            }
        }
        self.names.len() - before
    }

    /// Values of `row` aligned with the current columns
    ///
    /// Columns the row does not carry are empty.
    pub fn project(&self, row: &Row) -> Vec<String> {
        let mut values = vec![String::new(); self.names.len()];
        for column in row.columns() {
            if let (Some(&pos), Some(value)) = (self.positions.get(column), row.get(column)) {
                values[pos] = value.to_string();
            }
        }
        values
    }

    /// Column names in order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no column is known
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn push(&mut self, column: String) {
        if self.positions.contains_key(&column) {
            return;
        }
        self.positions.insert(column.clone(), self.names.len());
        self.names.push(column);
    }
}
