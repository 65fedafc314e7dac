//! KPI, breakdown and time-series aggregation
//!
//! Every operation takes a `View` and never mutates it. Sums use the
//! coerced cell values, so rows whose original text failed numeric
//! coercion contribute zero. Monthly buckets exclude rows with a null
//! date; the scalar KPIs deliberately do not.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::filter::{View, ALL_SENTINEL};
use crate::schema;

/// Scalar KPI summary over a view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_records: u64,
    pub total_sales: f64,
    pub total_quantity: i64,
    pub avg_order_value: f64,
}

/// One month's sales total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySales {
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "Total")]
    pub total: f64,
}

/// One month's order count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyOrders {
    #[serde(rename = "Month")]
    pub month: String,
    pub count: u64,
}

/// One month's average order value, rounded to 2 decimal places
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverage {
    #[serde(rename = "Month")]
    pub month: String,
    pub avg_value: f64,
    pub order_count: u64,
}

/// The three ascending-by-month series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    pub sales: Vec<MonthlySales>,
    pub orders: Vec<MonthlyOrders>,
    pub averages: Vec<MonthlyAverage>,
}

/// Grouped and scalar aggregation over filtered views
#[derive(Debug, Default)]
pub struct AggregationEngine;

impl AggregationEngine {
    /// Create an aggregation engine
    pub fn new() -> AggregationEngine {
        AggregationEngine
    }

    /// Scalar KPI bundle
    ///
    /// `avg_order_value` is `total_sales / total_records`, zero for an
    /// empty view. Rows with a null date still count here.
    pub fn kpis(&self, view: &View<'_>) -> Kpis {
        let total_records = view.len() as u64;
        let total_sales = self.column_sum(view, schema::TOTAL_COLUMN);
        let total_quantity = self.column_sum(view, schema::QUANTITY_COLUMN);
        let avg_order_value = if total_records > 0 {
            total_sales / total_records as f64
        } else {
            0.0
        };
        Kpis {
            total_records,
            total_sales,
            total_quantity: total_quantity as i64,
            avg_order_value,
        }
    }

    fn column_sum(&self, view: &View<'_>, column: &str) -> f64 {
        match view.dataset().schema().index_of(column) {
            Some(index) => view
                .records()
                .filter_map(|r| r.cell(index))
                .filter_map(|c| c.as_f64())
                .sum(),
            None => 0.0,
        }
    }

    /// Occurrence count of every distinct value in a column, including the
    /// empty string; a column missing from the schema yields an empty map
    pub fn category_counts(&self, view: &View<'_>, column: &str) -> HashMap<String, u64> {
        let Some(index) = view.dataset().schema().index_of(column) else {
            return HashMap::new();
        };
        let mut counts = HashMap::new();
        for record in view.records() {
            if let Some(cell) = record.cell(index) {
                *counts.entry(cell.label()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Sum of order totals grouped by state
    pub fn sum_by_state(&self, view: &View<'_>) -> HashMap<String, f64> {
        self.group_fold(view, schema::STATE_COLUMN, schema::TOTAL_COLUMN)
            .into_iter()
            .map(|(state, (sum, _))| (state, sum))
            .collect()
    }

    /// Arithmetic mean of quantity grouped by state
    pub fn avg_quantity_by_state(&self, view: &View<'_>) -> HashMap<String, f64> {
        self.group_fold(view, schema::STATE_COLUMN, schema::QUANTITY_COLUMN)
            .into_iter()
            .map(|(state, (sum, count))| (state, sum / count as f64))
            .collect()
    }

    /// Per-group `(sum, row count)` of a numeric column; empty when either
    /// column is missing from the schema
    fn group_fold(
        &self,
        view: &View<'_>,
        group_column: &str,
        value_column: &str,
    ) -> HashMap<String, (f64, u64)> {
        let schema = view.dataset().schema();
        let (Some(group_index), Some(value_index)) =
            (schema.index_of(group_column), schema.index_of(value_column))
        else {
            return HashMap::new();
        };

        let mut grouped: HashMap<String, (f64, u64)> = HashMap::new();
        for record in view.records() {
            let Some(key) = record.cell(group_index).map(|c| c.label()) else {
                continue;
            };
            let value = record
                .cell(value_index)
                .and_then(|c| c.as_f64())
                .unwrap_or(0.0);
            let entry = grouped.entry(key).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
        grouped
    }

    /// The `n` most frequent SKU values with their counts, descending by
    /// count; ties keep first-seen order in the view
    pub fn top_skus(&self, view: &View<'_>, n: usize) -> Vec<(String, u64)> {
        let Some(index) = view.dataset().schema().index_of(schema::SKU_COLUMN) else {
            return Vec::new();
        };

        let mut counts: HashMap<String, (usize, u64)> = HashMap::new();
        for (position, record) in view.records().enumerate() {
            if let Some(cell) = record.cell(index) {
                let entry = counts.entry(cell.label()).or_insert((position, 0));
                entry.1 += 1;
            }
        }

        let mut ranked: Vec<(String, (usize, u64))> = counts.into_iter().collect();
        ranked.sort_by(|(_, (seen_a, count_a)), (_, (seen_b, count_b))| {
            count_b.cmp(count_a).then(seen_a.cmp(seen_b))
        });
        ranked
            .into_iter()
            .take(n)
            .map(|(sku, (_, count))| (sku, count))
            .collect()
    }

    /// Monthly sales, order-count and average series, ascending by month
    /// label; rows with a null date are excluded from every bucket
    pub fn monthly_series(&self, view: &View<'_>) -> MonthlySeries {
        let schema = view.dataset().schema();
        let Some(date_index) = schema.index_of(schema::DATE_COLUMN) else {
            return MonthlySeries::default();
        };
        let total_index = schema.index_of(schema::TOTAL_COLUMN);

        let mut buckets: BTreeMap<String, (f64, u64)> = BTreeMap::new();
        for record in view.records() {
            let Some(month) = record.cell(date_index).and_then(|c| c.month_label()) else {
                continue;
            };
            let total = total_index
                .and_then(|i| record.cell(i))
                .and_then(|c| c.as_f64())
                .unwrap_or(0.0);
            let entry = buckets.entry(month).or_insert((0.0, 0));
            entry.0 += total;
            entry.1 += 1;
        }

        let mut series = MonthlySeries::default();
        for (month, (total, count)) in buckets {
            series.sales.push(MonthlySales {
                month: month.clone(),
                total,
            });
            series.orders.push(MonthlyOrders {
                month: month.clone(),
                count,
            });
            series.averages.push(MonthlyAverage {
                month,
                avg_value: round2(total / count as f64),
                order_count: count,
            });
        }
        series
    }

    /// Distinct non-empty values per fixed dimension in first-seen order,
    /// prefixed with the "All" sentinel; dimensions missing from the schema
    /// are omitted
    pub fn filter_options(&self, dataset: &Dataset) -> Vec<(String, Vec<String>)> {
        let mut options = Vec::new();
        for column in schema::FILTER_DIMENSIONS {
            let Some(index) = dataset.schema().index_of(column) else {
                continue;
            };
            let mut seen: HashSet<String> = HashSet::new();
            let mut values = vec![ALL_SENTINEL.to_string()];
            for record in dataset.rows() {
                let Some(value) = record.cell(index).and_then(|c| c.as_str()) else {
                    continue;
                };
                if !value.is_empty() && seen.insert(value.to_string()) {
                    values.push(value.to_string());
                }
            }
            options.push((column.to_string(), values));
        }
        options
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RawRow;
    use crate::filter::{FilterCriteria, FilterEngine};
    use crate::schema::{
        DATE_COLUMN, QUANTITY_COLUMN, SKU_COLUMN, STATE_COLUMN, STATUS_COLUMN, TOTAL_COLUMN,
    };

    fn raw(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sample() -> Dataset {
        Dataset::from_raw_rows(&[
            raw(&[
                (DATE_COLUMN, "05/01/2023"),
                (TOTAL_COLUMN, "10"),
                (QUANTITY_COLUMN, "1"),
                (STATUS_COLUMN, "Paid"),
                (STATE_COLUMN, "California"),
                (SKU_COLUMN, "A"),
            ]),
            raw(&[
                (DATE_COLUMN, "15/01/2023"),
                (TOTAL_COLUMN, "20"),
                (QUANTITY_COLUMN, "2"),
                (STATUS_COLUMN, "Pending"),
                (STATE_COLUMN, "Texas"),
                (SKU_COLUMN, "B"),
            ]),
            raw(&[
                (DATE_COLUMN, "10/02/2023"),
                (TOTAL_COLUMN, "30"),
                (QUANTITY_COLUMN, "3"),
                (STATUS_COLUMN, "Paid"),
                (STATE_COLUMN, "California"),
                (SKU_COLUMN, "A"),
            ]),
            raw(&[
                (DATE_COLUMN, "garbled"),
                (TOTAL_COLUMN, "40"),
                (QUANTITY_COLUMN, "4"),
                (STATUS_COLUMN, ""),
                (STATE_COLUMN, "Texas"),
                (SKU_COLUMN, "C"),
            ]),
        ])
    }

    fn full_view(dataset: &Dataset) -> View<'_> {
        FilterEngine::new().apply(dataset, &FilterCriteria::default())
    }

    #[test]
    fn test_kpis_sum_coerced_values() {
        let dataset = sample();
        let view = full_view(&dataset);
        let kpis = AggregationEngine::new().kpis(&view);
        assert_eq!(kpis.total_records, 4);
        assert_eq!(kpis.total_sales, 100.0);
        assert_eq!(kpis.total_quantity, 10);
        assert_eq!(kpis.avg_order_value, 25.0);
    }

    #[test]
    fn test_kpis_on_empty_view_are_zero() {
        let dataset = Dataset::from_raw_rows(&[]);
        let view = full_view(&dataset);
        let kpis = AggregationEngine::new().kpis(&view);
        assert_eq!(kpis.total_records, 0);
        assert_eq!(kpis.total_sales, 0.0);
        assert_eq!(kpis.avg_order_value, 0.0);
    }

    #[test]
    fn test_category_counts_include_empty_string() {
        let dataset = sample();
        let view = full_view(&dataset);
        let counts = AggregationEngine::new().category_counts(&view, STATUS_COLUMN);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts["Paid"], 2);
        assert_eq!(counts["Pending"], 1);
        assert_eq!(counts[""], 1);
    }

    #[test]
    fn test_category_counts_on_unknown_column_are_empty() {
        let dataset = sample();
        let view = full_view(&dataset);
        let counts = AggregationEngine::new().category_counts(&view, "No Such Column");
        assert!(counts.is_empty());
    }

    #[test]
    fn test_sum_and_mean_by_state() {
        let dataset = sample();
        let view = full_view(&dataset);
        let engine = AggregationEngine::new();

        let sums = engine.sum_by_state(&view);
        assert_eq!(sums["California"], 40.0);
        assert_eq!(sums["Texas"], 60.0);

        let means = engine.avg_quantity_by_state(&view);
        assert_eq!(means["California"], 2.0);
        assert_eq!(means["Texas"], 3.0);
    }

    #[test]
    fn test_top_skus_orders_by_count_then_first_seen() {
        let dataset = sample();
        let view = full_view(&dataset);
        let top = AggregationEngine::new().top_skus(&view, 10);
        // A appears twice; B and C tie at one and keep first-seen order
        assert_eq!(
            top,
            vec![
                ("A".to_string(), 2),
                ("B".to_string(), 1),
                ("C".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_top_skus_truncates_to_n() {
        let dataset = sample();
        let view = full_view(&dataset);
        let top = AggregationEngine::new().top_skus(&view, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, "A");
    }

    #[test]
    fn test_monthly_series_ascending_and_null_dates_excluded() {
        let dataset = sample();
        let view = full_view(&dataset);
        let series = AggregationEngine::new().monthly_series(&view);

        let months: Vec<&str> = series.sales.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, ["2023-01", "2023-02"]);
        assert_eq!(series.sales[0].total, 30.0);
        assert_eq!(series.sales[1].total, 30.0);

        // The garbled-date row is not in any bucket
        let counted: u64 = series.orders.iter().map(|p| p.count).sum();
        assert_eq!(counted, 3);

        assert_eq!(series.averages[0].avg_value, 15.0);
        assert_eq!(series.averages[0].order_count, 2);
    }

    #[test]
    fn test_monthly_average_rounds_to_two_decimals() {
        let dataset = Dataset::from_raw_rows(&[
            raw(&[(DATE_COLUMN, "05/01/2023"), (TOTAL_COLUMN, "10")]),
            raw(&[(DATE_COLUMN, "06/01/2023"), (TOTAL_COLUMN, "10")]),
            raw(&[(DATE_COLUMN, "07/01/2023"), (TOTAL_COLUMN, "1")]),
        ]);
        let view = full_view(&dataset);
        let series = AggregationEngine::new().monthly_series(&view);
        // 21 / 3 = 7.0; 10/3 style repeats round cleanly
        assert_eq!(series.averages[0].avg_value, 7.0);

        let dataset = Dataset::from_raw_rows(&[
            raw(&[(DATE_COLUMN, "05/01/2023"), (TOTAL_COLUMN, "10")]),
            raw(&[(DATE_COLUMN, "06/01/2023"), (TOTAL_COLUMN, "0")]),
            raw(&[(DATE_COLUMN, "07/01/2023"), (TOTAL_COLUMN, "0")]),
        ]);
        let view = full_view(&dataset);
        let series = AggregationEngine::new().monthly_series(&view);
        assert_eq!(series.averages[0].avg_value, 3.33);
    }

    #[test]
    fn test_filter_options_prefix_all_and_skip_empty() {
        let dataset = sample();
        let options = AggregationEngine::new().filter_options(&dataset);

        let status = options
            .iter()
            .find(|(column, _)| column == STATUS_COLUMN)
            .map(|(_, values)| values.clone())
            .unwrap();
        assert_eq!(status, vec!["All", "Paid", "Pending"]);

        let state = options
            .iter()
            .find(|(column, _)| column == STATE_COLUMN)
            .map(|(_, values)| values.clone())
            .unwrap();
        assert_eq!(state, vec!["All", "California", "Texas"]);

        // Columns absent from this dataset are omitted entirely
        assert!(!options.iter().any(|(column, _)| column == "Risk Level"));
    }
}
