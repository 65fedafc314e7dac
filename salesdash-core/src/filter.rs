//! Filter criteria and row views
//!
//! Criteria compile into a single conjunctive predicate over the columns
//! they name; one scan produces a `View` holding parent row indices in
//! load order. Views never copy rows and live no longer than the call
//! that produced them.

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::cell::parse_date;
use crate::dataset::{page_slice, Dataset, Record};
use crate::error::SalesdashResult;
use crate::schema::{self, Schema};

/// The designated filter value meaning "no constraint for this dimension"
pub const ALL_SENTINEL: &str = "All";

/// Optional filter criteria; an absent field passes all rows
///
/// Date bounds stay textual here: they are parsed with the same fixed
/// day/month/year format as load-time coercion when the criteria are
/// applied, and a present-but-unparsable bound matches nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub status: Option<String>,
    pub delivery_status: Option<String>,
    pub country: Option<String>,
    pub province: Option<String>,
    pub state: Option<String>,
    pub payment_method: Option<String>,
    pub min_total: Option<f64>,
    pub max_total: Option<f64>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl FilterCriteria {
    /// Active value of a categorical criterion: present, non-empty and not
    /// the "All" sentinel
    fn active(value: &Option<String>) -> Option<&str> {
        value
            .as_deref()
            .filter(|v| !v.is_empty() && *v != ALL_SENTINEL)
    }
}

/// A textual date bound after compilation
#[derive(Debug, Clone, Copy, PartialEq)]
enum DateBound {
    Absent,
    /// Present but unparsable; compares false against every row
    Unparsable,
    At(NaiveDateTime),
}

impl DateBound {
    fn compile(raw: &Option<String>) -> DateBound {
        match raw.as_deref() {
            None | Some("") => DateBound::Absent,
            Some(text) => match parse_date(text) {
                Some(ts) => DateBound::At(ts),
                None => DateBound::Unparsable,
            },
        }
    }

    fn admits_from(self, row: Option<NaiveDateTime>) -> bool {
        match self {
            DateBound::Absent => true,
            DateBound::Unparsable => false,
            DateBound::At(bound) => row.map_or(false, |d| d >= bound),
        }
    }

    fn admits_to(self, row: Option<NaiveDateTime>) -> bool {
        match self {
            DateBound::Absent => true,
            DateBound::Unparsable => false,
            DateBound::At(bound) => row.map_or(false, |d| d <= bound),
        }
    }
}

/// Criteria resolved against a concrete schema
///
/// A criterion whose column is missing from the schema keeps `None` as its
/// position and can never match.
struct CompiledCriteria<'c> {
    categorical: Vec<(Option<usize>, &'c str)>,
    total_index: Option<usize>,
    min_total: Option<f64>,
    max_total: Option<f64>,
    date_index: Option<usize>,
    from: DateBound,
    to: DateBound,
}

impl<'c> CompiledCriteria<'c> {
    fn compile(schema: &Schema, criteria: &'c FilterCriteria) -> CompiledCriteria<'c> {
        let mut categorical = Vec::new();
        for (column, value) in [
            (schema::STATUS_COLUMN, &criteria.status),
            (schema::DELIVER_STATUS_COLUMN, &criteria.delivery_status),
            (schema::SHIPPING_COUNTRY_COLUMN, &criteria.country),
            (schema::SHIPPING_PROVINCE_COLUMN, &criteria.province),
            (schema::STATE_COLUMN, &criteria.state),
            (schema::PAYMENT_METHOD_COLUMN, &criteria.payment_method),
        ] {
            if let Some(required) = FilterCriteria::active(value) {
                categorical.push((schema.index_of(column), required));
            }
        }

        CompiledCriteria {
            categorical,
            total_index: schema.index_of(schema::TOTAL_COLUMN),
            min_total: criteria.min_total,
            max_total: criteria.max_total,
            date_index: schema.index_of(schema::DATE_COLUMN),
            from: DateBound::compile(&criteria.from_date),
            to: DateBound::compile(&criteria.to_date),
        }
    }

    fn matches(&self, record: &Record) -> bool {
        for (index, required) in &self.categorical {
            let matched = index
                .and_then(|i| record.cell(i))
                .and_then(|cell| cell.as_str())
                .map_or(false, |value| value == *required);
            if !matched {
                return false;
            }
        }

        if self.min_total.is_some() || self.max_total.is_some() {
            let total = self
                .total_index
                .and_then(|i| record.cell(i))
                .and_then(|cell| cell.as_f64());
            if let Some(min) = self.min_total {
                if !total.map_or(false, |t| t >= min) {
                    return false;
                }
            }
            if let Some(max) = self.max_total {
                if !total.map_or(false, |t| t <= max) {
                    return false;
                }
            }
        }

        if self.from != DateBound::Absent || self.to != DateBound::Absent {
            let date = self
                .date_index
                .and_then(|i| record.cell(i))
                .and_then(|cell| cell.as_timestamp());
            if !self.from.admits_from(date) || !self.to.admits_to(date) {
                return false;
            }
        }

        true
    }
}

/// A read-only filtered subset of a dataset
///
/// Holds indices into the parent's rows, in load order. Equality of rows,
/// not a copy of them.
#[derive(Debug)]
pub struct View<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> View<'a> {
    /// Number of rows in the view
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when no row matched
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The parent dataset
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Records in view order
    pub fn records<'v>(&'v self) -> impl Iterator<Item = &'a Record> + 'v {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.rows()[i])
    }

    /// Page of records `[skip, skip + limit)` with the same clamping as the
    /// unfiltered table
    pub fn page<'v>(&'v self, skip: i64, limit: i64) -> impl Iterator<Item = &'a Record> + 'v {
        let dataset = self.dataset;
        page_slice(&self.indices, skip, limit)
            .iter()
            .map(move |&i| &dataset.rows()[i])
    }

    /// Materialize a page as JSON row objects
    pub fn page_json(&self, skip: i64, limit: i64) -> SalesdashResult<Vec<Map<String, Value>>> {
        self.page(skip, limit)
            .map(|record| self.dataset.row_to_json(record))
            .collect()
    }
}

/// Compiles criteria and scans the table
#[derive(Debug, Default)]
pub struct FilterEngine;

impl FilterEngine {
    /// Create a filter engine
    pub fn new() -> FilterEngine {
        FilterEngine
    }

    /// Apply criteria to a dataset, producing a view over the matching rows
    /// in load order. With no active criterion the view covers the whole
    /// table.
    pub fn apply<'a>(&self, dataset: &'a Dataset, criteria: &FilterCriteria) -> View<'a> {
        let compiled = CompiledCriteria::compile(dataset.schema(), criteria);
        let indices = dataset
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, record)| compiled.matches(record))
            .map(|(i, _)| i)
            .collect();
        View { dataset, indices }
    }
}
