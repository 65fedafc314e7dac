//! The in-memory transaction table
//!
//! A `Dataset` owns the coerced rows, their schema and a monotonically
//! increasing version. Rows keep load order forever: nothing is deleted or
//! reordered after load, and the only later mutation is column addition.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::cell::CellValue;
use crate::error::{SalesdashError, SalesdashResult};
use crate::schema::Schema;

/// One raw input row: `(column name, raw text)` pairs in source order
pub type RawRow = Vec<(String, String)>;

/// One coerced transaction; cells are aligned to the schema's column order
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    cells: Vec<CellValue>,
}

impl Record {
    fn new(cells: Vec<CellValue>) -> Record {
        Record { cells }
    }

    /// Cell at a schema position
    pub fn cell(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }

    /// All cells in schema order
    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the record carries no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// The table: schema + ordered rows + version
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    schema: Schema,
    rows: Vec<Record>,
    version: u64,
}

impl Dataset {
    /// Build a dataset from raw row mappings
    ///
    /// The schema's columns are the union of the input keys in first-seen
    /// order. Every cell is coerced per its column kind; keys missing from
    /// a row get the kind's absent default, so no row is ever dropped.
    pub fn from_raw_rows(raw_rows: &[RawRow]) -> Dataset {
        let mut names: Vec<String> = Vec::new();
        for row in raw_rows {
            for (name, _) in row {
                if !names.iter().any(|n| n == name) {
                    names.push(name.clone());
                }
            }
        }
        let schema = Schema::from_names(names);

        let rows = raw_rows
            .iter()
            .map(|raw| {
                let lookup: HashMap<&str, &str> = raw
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str()))
                    .collect();
                let cells = schema
                    .columns()
                    .iter()
                    .map(|col| match lookup.get(col.name.as_str()) {
                        Some(value) => CellValue::coerce(value, col.kind),
                        None => CellValue::absent(col.kind),
                    })
                    .collect();
                Record::new(cells)
            })
            .collect();

        Dataset {
            schema,
            rows,
            version: 0,
        }
    }

    /// The current schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Version counter; bumped by every mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in load order
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Append a categorical column holding `default_value` on every row
    ///
    /// Fails without touching anything if the name is already taken.
    pub fn add_column(&mut self, name: &str, default_value: &str) -> SalesdashResult<()> {
        self.schema.push_categorical(name)?;
        for row in &mut self.rows {
            row.cells.push(CellValue::Text(default_value.to_string()));
        }
        self.version += 1;
        Ok(())
    }

    /// Page slice `[skip, skip + limit)` in stored order
    ///
    /// Negative skip reads from the start, non-positive limit and
    /// out-of-range skip produce an empty slice. Never errors.
    pub fn page(&self, skip: i64, limit: i64) -> &[Record] {
        page_slice(&self.rows, skip, limit)
    }

    /// Materialize one row as a JSON object in schema column order
    pub fn row_to_json(&self, record: &Record) -> SalesdashResult<Map<String, Value>> {
        if record.len() != self.schema.len() {
            return Err(SalesdashError::computation(format!(
                "row has {} cells but the schema has {} columns",
                record.len(),
                self.schema.len()
            )));
        }
        let mut map = Map::with_capacity(self.schema.len());
        for (col, cell) in self.schema.columns().iter().zip(record.cells()) {
            map.insert(col.name.clone(), cell.to_json()?);
        }
        Ok(map)
    }
}

/// Paging clamp shared by the full table and filtered views
pub(crate) fn page_slice<T>(rows: &[T], skip: i64, limit: i64) -> &[T] {
    if limit <= 0 {
        return &[];
    }
    let start = skip.max(0) as usize;
    if start >= rows.len() {
        return &[];
    }
    let end = start.saturating_add(limit as usize).min(rows.len());
    &rows[start..end]
}
