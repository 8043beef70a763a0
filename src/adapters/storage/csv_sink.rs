//! Header-less CSV table sink
//!
//! Each table is written to `{dir}/{table}.csv` without a header row; the
//! column list lives in the table's manifest instead. Rows are streamed as
//! they arrive. When the column list grew during the run, `finish` rewrites
//! the file once so every row has the final width. A table that received no
//! row and has no column is removed by `finish`.
//!
//! A sink dropped without `finish` (an aborted run) only flushes: rows keep
//! the width they had when written and no manifest describes them.

use super::traits::{SinkFactory, TableSink};
use crate::domain::ids::TableName;
use crate::domain::{Result, StrataError};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Opens [`CsvTableSink`]s below one directory
#[derive(Debug, Clone)]
pub struct CsvSinkFactory {
    dir: PathBuf,
}

impl CsvSinkFactory {
    /// Create a factory writing into `dir`, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            StrataError::Storage(format!(
                "Failed to create table directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self { dir })
    }

    /// Directory the tables are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SinkFactory for CsvSinkFactory {
    fn open(&self, table: &TableName) -> Result<Box<dyn TableSink>> {
        Ok(Box::new(CsvTableSink::create(&self.dir, table.clone())?))
    }
}

/// CSV file for one table
///
/// The underlying writer is flushed on drop, so an aborted run still leaves
/// every row written so far on disk, unpadded.
pub struct CsvTableSink {
    table: TableName,
    path: PathBuf,
    writer: Option<csv::Writer<BufWriter<File>>>,
    rows_written: usize,
    narrowest_row: Option<usize>,
}

impl CsvTableSink {
    /// Create (or truncate) `{dir}/{table}.csv`
    pub fn create(dir: &Path, table: TableName) -> Result<Self> {
        let path = table_path(dir, &table);
        let file = File::create(&path).map_err(|e| {
            StrataError::Storage(format!("Failed to create {}: {}", path.display(), e))
        })?;

        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(BufWriter::new(file));

        tracing::debug!(table = %table, path = %path.display(), "Opened table");

        Ok(Self {
            table,
            path,
            writer: Some(writer),
            rows_written: 0,
            narrowest_row: None,
        })
    }

    /// Path of the CSV file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> Result<&mut csv::Writer<BufWriter<File>>> {
        self.writer
            .as_mut()
            .ok_or_else(|| StrataError::Storage(format!("Table {} is already closed", self.table)))
    }

    /// Rewrite the file with every row padded to `width` cells
    fn pad_rows(&self, width: usize) -> Result<()> {
        let tmp_path = self.path.with_extension("csv.tmp");

        {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(&self.path)?;
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp_path)?;

            for record in reader.records() {
                let record = record?;
                let mut cells: Vec<&str> = record.iter().collect();
                cells.resize(width, "");
                writer.write_record(&cells)?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            StrataError::Storage(format!(
                "Failed to replace {} after padding: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }
}

impl TableSink for CsvTableSink {
    fn table(&self) -> &TableName {
        &self.table
    }

    fn append(&mut self, values: &[String]) -> Result<()> {
        self.writer()?.write_record(values)?;
        self.rows_written += 1;
        self.narrowest_row = Some(
            self.narrowest_row
                .map_or(values.len(), |n| n.min(values.len())),
        );
        Ok(())
    }

    fn finish(&mut self, columns: &[String]) -> Result<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        writer.flush()?;
        drop(writer);

        if self.rows_written == 0 && columns.is_empty() {
            fs::remove_file(&self.path).map_err(|e| {
                StrataError::Storage(format!(
                    "Failed to remove empty table {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
            tracing::debug!(table = %self.table, "Removed empty table");
            return Ok(());
        }

        if self.narrowest_row.is_some_and(|n| n < columns.len()) {
            tracing::debug!(
                table = %self.table,
                columns = columns.len(),
                "Padding rows written before new columns appeared"
            );
            self.pad_rows(columns.len())?;
        }

        tracing::debug!(
            table = %self.table,
            rows = self.rows_written,
            "Closed table"
        );
        Ok(())
    }

    fn rows_written(&self) -> usize {
        self.rows_written
    }
}

impl Drop for CsvTableSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                tracing::error!(table = %self.table, error = %e, "Failed to flush table on drop");
            }
        }
    }
}

/// Path of the CSV file for `table`
pub fn table_path(dir: &Path, table: &TableName) -> PathBuf {
    dir.join(format!("{}.csv", table.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn values(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn columns(names: &[&str]) -> Vec<String> {
        values(names)
    }

    #[test]
    fn test_writes_headerless_rows() {
        let dir = TempDir::new().unwrap();
        let factory = CsvSinkFactory::new(dir.path()).unwrap();
        let mut sink = factory.open(&TableName::new("order").unwrap()).unwrap();

        sink.append(&values(&["1", "processing"])).unwrap();
        sink.append(&values(&["2", "with, comma"])).unwrap();
        sink.finish(&columns(&["id", "status"])).unwrap();

        let content = fs::read_to_string(dir.path().join("order.csv")).unwrap();
        assert_eq!(content, "1,processing\n2,\"with, comma\"\n");
        assert_eq!(sink.rows_written(), 2);
    }

    #[test]
    fn test_finish_pads_short_rows() {
        let dir = TempDir::new().unwrap();
        let mut sink =
            CsvTableSink::create(dir.path(), TableName::new("customer").unwrap()).unwrap();

        sink.append(&values(&["1", "a@example.com"])).unwrap();
        sink.append(&values(&["2", "b@example.com", "VIP"])).unwrap();
        sink.finish(&columns(&["id", "email", "role"])).unwrap();

        let content = fs::read_to_string(sink.path()).unwrap();
        assert_eq!(content, "1,a@example.com,\n2,b@example.com,VIP\n");
        assert!(!dir.path().join("customer.csv.tmp").exists());
    }

    #[test]
    fn test_append_after_finish_fails() {
        let dir = TempDir::new().unwrap();
        let mut sink = CsvTableSink::create(dir.path(), TableName::new("product").unwrap()).unwrap();
        sink.finish(&columns(&["id"])).unwrap();

        assert!(sink.append(&values(&["1"])).is_err());
        // finishing twice is harmless
        assert!(sink.finish(&columns(&["id"])).is_ok());
    }

    #[test]
    fn test_drop_flushes_rows_without_padding() {
        let dir = TempDir::new().unwrap();
        {
            let mut sink =
                CsvTableSink::create(dir.path(), TableName::new("order").unwrap()).unwrap();
            sink.append(&values(&["1"])).unwrap();
            sink.append(&values(&["2", "EUR"])).unwrap();
        }

        let content = fs::read_to_string(dir.path().join("order.csv")).unwrap();
        assert_eq!(content, "1\n2,EUR\n");
    }

    #[test]
    fn test_finish_removes_unused_table() {
        let dir = TempDir::new().unwrap();
        let mut sink =
            CsvTableSink::create(dir.path(), TableName::new("order_refunds").unwrap()).unwrap();
        assert!(sink.path().exists());

        sink.finish(&[]).unwrap();

        assert!(!dir.path().join("order_refunds.csv").exists());
        assert!(sink.finish(&[]).is_ok());
    }
}
