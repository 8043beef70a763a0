//! Table writers
//!
//! - [`entity_writer`] - recursive decomposition of records into linked tables
//! - [`columns`] - first-seen column tracking

pub mod columns;
pub mod entity_writer;

pub use columns::ColumnSet;
pub use entity_writer::{record_id, EntityWriter, WriterContext, EXTRACTION_TIME_COLUMN};
