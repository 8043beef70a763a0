//! Output storage: table sinks, manifests and run state
//!
//! Everything lives below one data directory:
//!
//! ```text
//! {data_dir}/in/state.json                   previous run state
//! {data_dir}/out/state.json                  state for the next run
//! {data_dir}/out/tables/{table}.csv          header-less rows
//! {data_dir}/out/tables/{table}.csv.manifest primary key, columns, load flag
//! ```

pub mod csv_sink;
pub mod manifest;
pub mod state_file;
pub mod traits;

pub use csv_sink::{CsvSinkFactory, CsvTableSink};
pub use manifest::{ManifestWriter, TableManifest};
pub use state_file::JsonStateStore;
pub use traits::{SinkFactory, StateStore, TableSink};

use std::path::{Path, PathBuf};

/// Paths derived from the data directory
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Layout rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: data_dir.into(),
        }
    }

    /// Data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding output tables and manifests
    pub fn tables_dir(&self) -> PathBuf {
        self.root.join("out").join("tables")
    }

    /// State file left by the previous run
    pub fn input_state(&self) -> PathBuf {
        self.root.join("in").join("state.json")
    }

    /// State file written by this run
    pub fn output_state(&self) -> PathBuf {
        self.root.join("out").join("state.json")
    }

    /// State store reading and writing this layout's state files
    pub fn state_store(&self) -> JsonStateStore {
        JsonStateStore::new(self.input_state(), self.output_state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_layout_paths() {
        let layout = DataLayout::new("/data");
        assert_eq!(layout.tables_dir(), PathBuf::from("/data/out/tables"));
        assert_eq!(layout.input_state(), PathBuf::from("/data/in/state.json"));
        assert_eq!(layout.output_state(), PathBuf::from("/data/out/state.json"));
    }
}
