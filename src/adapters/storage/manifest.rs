//! Table manifests
//!
//! Every output table is declared by a JSON file next to it,
//! `{table}.csv.manifest`, holding the primary key, the column list and the
//! load flag the destination uses to merge rows.

use crate::domain::{Result, StrataError, TableDescriptor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableManifest {
    /// Merge rows by primary key instead of replacing the table
    pub incremental: bool,

    /// Primary-key columns
    pub primary_key: Vec<String>,

    /// Column names in file order
    pub columns: Vec<String>,
}

impl TableManifest {
    /// Manifest for a finished table
    pub fn from_descriptor(descriptor: &TableDescriptor, incremental: bool) -> Self {
        Self {
            incremental,
            primary_key: descriptor.primary_key.clone(),
            columns: descriptor.columns.clone(),
        }
    }
}

/// Writes manifests into the table directory
#[derive(Debug, Clone)]
pub struct ManifestWriter {
    dir: PathBuf,
}

impl ManifestWriter {
    /// Create a writer for `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write the manifest of one table
    ///
    /// # Returns
    ///
    /// The path of the written manifest
    pub fn write(&self, descriptor: &TableDescriptor, incremental: bool) -> Result<PathBuf> {
        let manifest = TableManifest::from_descriptor(descriptor, incremental);
        let path = manifest_path(&self.dir, descriptor.name.as_str());
        let json = serde_json::to_string_pretty(&manifest)?;

        fs::write(&path, json).map_err(|e| {
            StrataError::Storage(format!(
                "Failed to write manifest {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!(table = %descriptor.name, path = %path.display(), "Wrote manifest");
        Ok(path)
    }
}

fn manifest_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{table}.csv.manifest"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TableName;
    use tempfile::TempDir;

    #[test]
    fn test_write_manifest() {
        let dir = TempDir::new().unwrap();
        let writer = ManifestWriter::new(dir.path());
        let descriptor = TableDescriptor {
            name: TableName::new("order_line_items").unwrap(),
            primary_key: vec!["id".to_string(), "order_id".to_string()],
            columns: vec![
                "order_id".to_string(),
                "id".to_string(),
                "name".to_string(),
            ],
            rows_written: 3,
        };

        let path = writer.write(&descriptor, true).unwrap();
        assert!(path.ends_with("order_line_items.csv.manifest"));

        let manifest: TableManifest =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert!(manifest.incremental);
        assert_eq!(manifest.primary_key, vec!["id", "order_id"]);
        assert_eq!(manifest.columns, vec!["order_id", "id", "name"]);
    }
}
