//! CSV ingestion
//!
//! Reads the source export into raw header/value pairs for the dataset
//! store. Rows shorter than the header are padded by the store's schema
//! union, so ragged exports still load.

use std::path::Path;

use tracing::info;

use salesdash_core::{RawRow, SalesdashError, SalesdashResult};

/// Read every row of a CSV file as (header, value) pairs
pub fn load_csv(path: &Path) -> SalesdashResult<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| SalesdashError::csv(format!("open {}: {}", path.display(), e)))?;

    let headers = reader
        .headers()
        .map_err(|e| SalesdashError::csv(format!("read header: {e}")))?
        .clone();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| SalesdashError::csv(format!("record {}: {}", line + 2, e)))?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }

    info!(rows = rows.len(), path = %path.display(), "loaded CSV source");
    Ok(rows)
}
