//! Versioned dataset storage
//!
//! One writer at a time, any number of concurrent readers. A reader pins
//! the current dataset version for its whole synchronous computation
//! through the read guard; mutations take the write guard, apply in place
//! and bump the version before the guard drops. No reader can observe a
//! half-applied schema change, and no mutation copies the table.

use parking_lot::{RwLock, RwLockReadGuard};

use crate::dataset::{Dataset, RawRow};
use crate::error::SalesdashResult;

/// Owner of the process-wide dataset
#[derive(Debug, Default)]
pub struct DatasetStore {
    dataset: RwLock<Dataset>,
}

impl DatasetStore {
    /// Create a store holding an empty dataset
    pub fn new() -> DatasetStore {
        DatasetStore {
            dataset: RwLock::new(Dataset::default()),
        }
    }

    /// Replace the whole dataset from raw rows
    ///
    /// Prior state, including any columns added at runtime, is discarded.
    /// Returns the number of rows loaded.
    pub fn load(&self, raw_rows: &[RawRow]) -> usize {
        let mut dataset = Dataset::from_raw_rows(raw_rows);
        let mut guard = self.dataset.write();
        dataset.set_version(guard.version() + 1);
        *guard = dataset;
        guard.len()
    }

    /// Pin the current dataset version for reading
    pub fn read(&self) -> RwLockReadGuard<'_, Dataset> {
        self.dataset.read()
    }

    /// Ordered column names of the current schema
    pub fn column_names(&self) -> Vec<String> {
        self.dataset.read().schema().names()
    }

    /// Append a categorical column across every row
    pub fn add_column(&self, name: &str, default_value: &str) -> SalesdashResult<()> {
        self.dataset.write().add_column(name, default_value)
    }
}
