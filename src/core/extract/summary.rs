//! Extraction summary and reporting
//!
//! This module defines structures for tracking and reporting extraction results.

use crate::domain::ids::Endpoint;
use crate::domain::TableDescriptor;
use std::time::Duration;
use uuid::Uuid;

/// Counters for one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSummary {
    /// Extracted endpoint
    pub endpoint: Endpoint,

    /// Pages fetched
    pub pages: u32,

    /// Records decomposed and written
    pub records_written: usize,

    /// Records skipped because they could not be decomposed
    pub records_skipped: usize,
}

impl EndpointSummary {
    /// Empty counters for `endpoint`
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            pages: 0,
            records_written: 0,
            records_skipped: 0,
        }
    }
}

/// Summary of an extraction run
#[derive(Debug, Clone)]
pub struct ExtractSummary {
    /// Identifier of the run, included in log lines
    pub run_id: Uuid,

    /// Timestamp written to every row
    pub extraction_time: String,

    /// Per-endpoint counters, in extraction order
    pub endpoints: Vec<EndpointSummary>,

    /// Every table produced, parents before children
    pub tables: Vec<TableDescriptor>,

    /// Duration of the run
    pub duration: Duration,
}

impl ExtractSummary {
    /// Create a new empty summary
    pub fn new(run_id: Uuid, extraction_time: impl Into<String>) -> Self {
        Self {
            run_id,
            extraction_time: extraction_time.into(),
            endpoints: Vec::new(),
            tables: Vec::new(),
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Records written across all endpoints
    pub fn records_written(&self) -> usize {
        self.endpoints.iter().map(|e| e.records_written).sum()
    }

    /// Records skipped across all endpoints
    pub fn records_skipped(&self) -> usize {
        self.endpoints.iter().map(|e| e.records_skipped).sum()
    }

    /// Rows written across all tables
    pub fn rows_written(&self) -> usize {
        self.tables.iter().map(|t| t.rows_written).sum()
    }

    /// Whether any record was skipped
    pub fn has_skips(&self) -> bool {
        self.records_skipped() > 0
    }

    /// Check if the run completed without skipping records
    pub fn is_successful(&self) -> bool {
        !self.has_skips()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        for endpoint in &self.endpoints {
            tracing::info!(
                run_id = %self.run_id,
                endpoint = %endpoint.endpoint,
                pages = endpoint.pages,
                records_written = endpoint.records_written,
                records_skipped = endpoint.records_skipped,
                "Endpoint extracted"
            );
        }

        tracing::info!(
            run_id = %self.run_id,
            records_written = self.records_written(),
            records_skipped = self.records_skipped(),
            tables = self.tables.len(),
            rows_written = self.rows_written(),
            duration_secs = self.duration.as_secs(),
            "Extraction completed"
        );

        if self.has_skips() {
            tracing::warn!(
                records_skipped = self.records_skipped(),
                "Extraction completed with skipped records"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TableName;

    fn summary() -> ExtractSummary {
        let mut summary = ExtractSummary::new(Uuid::new_v4(), "2024-05-01T10:00:00.000000");
        summary.endpoints.push(EndpointSummary {
            endpoint: Endpoint::Orders,
            pages: 2,
            records_written: 10,
            records_skipped: 0,
        });
        summary.endpoints.push(EndpointSummary {
            endpoint: Endpoint::Customers,
            pages: 1,
            records_written: 3,
            records_skipped: 0,
        });
        summary.tables.push(TableDescriptor {
            name: TableName::new("order").unwrap(),
            primary_key: vec!["id".to_string()],
            columns: vec!["id".to_string()],
            rows_written: 10,
        });
        summary
    }

    #[test]
    fn test_totals() {
        let summary = summary().with_duration(Duration::from_secs(5));
        assert_eq!(summary.records_written(), 13);
        assert_eq!(summary.rows_written(), 10);
        assert_eq!(summary.duration, Duration::from_secs(5));
        assert!(summary.is_successful());
    }

    #[test]
    fn test_skips_mark_run_unsuccessful() {
        let mut summary = summary();
        summary.endpoints[1].records_skipped = 1;
        assert!(summary.has_skips());
        assert!(!summary.is_successful());
        assert_eq!(summary.records_skipped(), 1);
    }
}
