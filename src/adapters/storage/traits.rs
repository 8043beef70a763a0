//! Storage abstraction traits
//!
//! [`TableSink`] is the row stream of one output table, [`SinkFactory`] opens
//! sinks by table name, and [`StateStore`] persists the run state between
//! runs. The extraction core only talks to these traits.

use crate::core::state::RunState;
use crate::domain::ids::TableName;
use crate::domain::Result;
use async_trait::async_trait;

/// Append-only row stream of one output table
///
/// Rows are passed as values aligned with the table's column list at the time
/// of writing. Because columns are only ever appended, an earlier row may be
/// shorter than a later one; [`TableSink::finish`] pads every row to the
/// final width.
pub trait TableSink: Send {
    /// Table this sink writes
    fn table(&self) -> &TableName;

    /// Append one row
    fn append(&mut self, values: &[String]) -> Result<()>;

    /// Flush and pad rows to the final column list
    ///
    /// After `finish` the sink accepts no more rows. A sink finished without
    /// rows or columns leaves no output behind.
    fn finish(&mut self, columns: &[String]) -> Result<()>;

    /// Number of rows appended so far
    fn rows_written(&self) -> usize;
}

/// Opens table sinks
pub trait SinkFactory {
    /// Open a fresh sink for `table`
    fn open(&self, table: &TableName) -> Result<Box<dyn TableSink>>;
}

/// Run state persistence
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the state left by the previous run
    ///
    /// Returns an empty state when there is none.
    async fn load(&self) -> Result<RunState>;

    /// Persist the state for the next run
    async fn save(&self, state: &RunState) -> Result<()>;
}
