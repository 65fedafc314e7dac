//! Column schema: type tags, ordered columns and the known dimension names
//!
//! Type tags are fixed at load time from each column's declared role; only
//! categorical columns can be added afterwards. Column order is load order
//! and drives pagination output and row materialization.

use serde::{Deserialize, Serialize};

use crate::error::{SalesdashError, SalesdashResult};

/// Order date column
pub const DATE_COLUMN: &str = "Date";
/// Order value column
pub const TOTAL_COLUMN: &str = "Total";
/// Unit count column
pub const QUANTITY_COLUMN: &str = "Quantity";
/// Order status column
pub const STATUS_COLUMN: &str = "Status";
/// Delivery status column
pub const DELIVER_STATUS_COLUMN: &str = "Deliver Status";
/// Shipping country column
pub const SHIPPING_COUNTRY_COLUMN: &str = "Shipping Country";
/// Shipping province column
pub const SHIPPING_PROVINCE_COLUMN: &str = "Shipping Province";
/// Geographic state column
pub const STATE_COLUMN: &str = "State";
/// Payment method column
pub const PAYMENT_METHOD_COLUMN: &str = "Payment Method";
/// Risk level column
pub const RISK_LEVEL_COLUMN: &str = "Risk Level";
/// Stock keeping unit column
pub const SKU_COLUMN: &str = "SKU";

/// Fixed categorical dimensions offered as filter options, in presentation
/// order. Dimensions are never inferred from the data.
pub const FILTER_DIMENSIONS: [&str; 7] = [
    STATUS_COLUMN,
    DELIVER_STATUS_COLUMN,
    SHIPPING_COUNTRY_COLUMN,
    SHIPPING_PROVINCE_COLUMN,
    PAYMENT_METHOD_COLUMN,
    RISK_LEVEL_COLUMN,
    STATE_COLUMN,
];

/// Type tag assigned to a column at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Finite floating point; parse failures coerce to 0
    Numeric,
    /// Day/month/year dates; parse failures coerce to null
    Timestamp,
    /// Free-form text; missing values coerce to ""
    Categorical,
}

impl ColumnKind {
    /// Kind a column gets from its declared role
    pub fn for_column(name: &str) -> ColumnKind {
        match name {
            DATE_COLUMN => ColumnKind::Timestamp,
            TOTAL_COLUMN | QUANTITY_COLUMN => ColumnKind::Numeric,
            _ => ColumnKind::Categorical,
        }
    }
}

/// A named, typed column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ColumnKind,
}

/// Ordered set of columns
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    /// Build a schema from column names in first-seen order
    pub fn from_names<I, S>(names: I) -> Schema
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = names
            .into_iter()
            .map(|n| {
                let name = n.into();
                let kind = ColumnKind::for_column(&name);
                ColumnDef { name, kind }
            })
            .collect();
        Schema { columns }
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when no column is defined
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column by exact name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// True when the column exists
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Column names in declaration order
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Kind of a column, if present
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.index_of(name).map(|i| self.columns[i].kind)
    }

    /// Append a categorical column; existing names are rejected, the schema
    /// never silently overwrites
    pub fn push_categorical(&mut self, name: &str) -> SalesdashResult<usize> {
        if self.contains(name) {
            return Err(SalesdashError::duplicate_column(name));
        }
        self.columns.push(ColumnDef {
            name: name.to_string(),
            kind: ColumnKind::Categorical,
        });
        Ok(self.columns.len() - 1)
    }
}
