//! Cell values and coercion rules
//!
//! Coercion is a pure function from raw text and a column kind to a typed
//! cell. Failures never drop a row: numeric failures (and non-finite
//! parses) become `0`, date failures become a null timestamp, and
//! categorical text passes through unchanged.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::{SalesdashError, SalesdashResult};
use crate::schema::ColumnKind;
use crate::{DATE_INPUT_FORMAT, DATE_OUTPUT_FORMAT, MONTH_LABEL_FORMAT};

/// A single typed cell of the dataset
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Categorical or free-form text
    Text(String),
    /// Coerced numeric value, always finite
    Number(f64),
    /// Parsed timestamp; `None` when the raw text failed to parse
    Timestamp(Option<NaiveDateTime>),
}

impl CellValue {
    /// Coerce raw text into a cell of the given kind
    pub fn coerce(raw: &str, kind: ColumnKind) -> CellValue {
        match kind {
            ColumnKind::Numeric => CellValue::Number(coerce_numeric(raw)),
            ColumnKind::Timestamp => CellValue::Timestamp(parse_date(raw)),
            ColumnKind::Categorical => CellValue::Text(raw.to_string()),
        }
    }

    /// Default cell for a kind when the raw value is missing entirely
    pub fn absent(kind: ColumnKind) -> CellValue {
        match kind {
            ColumnKind::Numeric => CellValue::Number(0.0),
            ColumnKind::Timestamp => CellValue::Timestamp(None),
            ColumnKind::Categorical => CellValue::Text(String::new()),
        }
    }

    /// Numeric view of the cell
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view of the cell
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Timestamp view of the cell; `None` for null or non-timestamp cells
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Timestamp(ts) => *ts,
            _ => None,
        }
    }

    /// Month bucket label (`YYYY-MM`); `None` for null or non-timestamp cells
    pub fn month_label(&self) -> Option<String> {
        self.as_timestamp()
            .map(|ts| ts.format(MONTH_LABEL_FORMAT).to_string())
    }

    /// Textual grouping label for breakdowns
    ///
    /// Text cells group by their value, null timestamps by the empty
    /// string. The non-text renderings only matter if a breakdown is ever
    /// asked of a typed column.
    pub fn label(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(v) => v.to_string(),
            CellValue::Timestamp(Some(ts)) => ts.format(DATE_OUTPUT_FORMAT).to_string(),
            CellValue::Timestamp(None) => String::new(),
        }
    }

    /// JSON rendering used when materializing row pages
    pub fn to_json(&self) -> SalesdashResult<Value> {
        match self {
            CellValue::Text(s) => Ok(Value::String(s.clone())),
            CellValue::Number(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .ok_or_else(|| {
                    SalesdashError::computation(format!("non-finite number {v} in row output"))
                }),
            CellValue::Timestamp(Some(ts)) => {
                Ok(Value::String(ts.format(DATE_OUTPUT_FORMAT).to_string()))
            }
            CellValue::Timestamp(None) => Ok(Value::Null),
        }
    }

    /// Human-readable kind name
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Text(_) => "text",
            CellValue::Number(_) => "number",
            CellValue::Timestamp(_) => "timestamp",
        }
    }
}

/// Best-effort numeric coercion; parse failures and non-finite values
/// become `0`
pub fn coerce_numeric(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Strict date parsing in the fixed day/month/year input format, producing
/// a midnight timestamp; anything else is a null timestamp
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(raw.trim(), DATE_INPUT_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
