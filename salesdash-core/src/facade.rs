//! Per-operation composition of store, filter and aggregation
//!
//! The facade is the only seam the transport layer talks to. Each method
//! pins one dataset version, runs synchronously to completion and returns
//! plain maps, lists and scalars. Failures surface as typed errors; a
//! bundle is either produced whole or not at all.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::aggregate::{AggregationEngine, MonthlyAverage, MonthlyOrders, MonthlySales};
use crate::error::SalesdashResult;
use crate::filter::{FilterCriteria, FilterEngine};
use crate::schema;
use crate::store::DatasetStore;
use crate::TOP_SKU_COUNT;

/// Everything the full stats operation reports
#[derive(Debug, Clone, Serialize)]
pub struct FullStats {
    pub total_records: u64,
    pub total_sales: f64,
    pub total_quantity: i64,
    pub avg_order_value: f64,
    pub state_counts: HashMap<String, u64>,
    pub state_values: HashMap<String, f64>,
    pub avg_quantity_by_state: HashMap<String, f64>,
    pub status_counts: HashMap<String, u64>,
    pub delivery_status_counts: HashMap<String, u64>,
    pub country_counts: HashMap<String, u64>,
    pub payment_method_counts: HashMap<String, u64>,
    pub monthly_sales: Vec<MonthlySales>,
    pub monthly_orders: Vec<MonthlyOrders>,
    pub monthly_avg_values: Vec<MonthlyAverage>,
    /// At most [`TOP_SKU_COUNT`] entries, inserted in descending count order
    pub top_skus: Map<String, Value>,
}

/// The reduced bundle the filtered stats operation reports
#[derive(Debug, Clone, Serialize)]
pub struct FilteredStats {
    pub total_count: u64,
    pub total_sales: f64,
    pub avg_order_value: f64,
    pub total_quantity: i64,
    pub state_breakdown: HashMap<String, f64>,
    pub status_breakdown: HashMap<String, u64>,
}

/// Facade over the core: one method per transport operation
#[derive(Debug)]
pub struct QueryFacade {
    store: Arc<DatasetStore>,
    filter: FilterEngine,
    aggregation: AggregationEngine,
}

impl QueryFacade {
    /// Wrap a store with the query engines
    pub fn new(store: Arc<DatasetStore>) -> QueryFacade {
        QueryFacade {
            store,
            filter: FilterEngine::new(),
            aggregation: AggregationEngine::new(),
        }
    }

    /// Unfiltered page of rows in load order
    pub fn get_page(&self, skip: i64, limit: i64) -> SalesdashResult<Vec<Map<String, Value>>> {
        let dataset = self.store.read();
        dataset
            .page(skip, limit)
            .iter()
            .map(|record| dataset.row_to_json(record))
            .collect()
    }

    /// Full stats bundle over the whole dataset
    pub fn get_full_stats(&self) -> SalesdashResult<FullStats> {
        let dataset = self.store.read();
        let view = self.filter.apply(&dataset, &FilterCriteria::default());
        let kpis = self.aggregation.kpis(&view);
        let series = self.aggregation.monthly_series(&view);

        let mut top_skus = Map::new();
        for (sku, count) in self.aggregation.top_skus(&view, TOP_SKU_COUNT) {
            top_skus.insert(sku, Value::from(count));
        }

        Ok(FullStats {
            total_records: kpis.total_records,
            total_sales: kpis.total_sales,
            total_quantity: kpis.total_quantity,
            avg_order_value: kpis.avg_order_value,
            state_counts: self.aggregation.category_counts(&view, schema::STATE_COLUMN),
            state_values: self.aggregation.sum_by_state(&view),
            avg_quantity_by_state: self.aggregation.avg_quantity_by_state(&view),
            status_counts: self.aggregation.category_counts(&view, schema::STATUS_COLUMN),
            delivery_status_counts: self
                .aggregation
                .category_counts(&view, schema::DELIVER_STATUS_COLUMN),
            country_counts: self
                .aggregation
                .category_counts(&view, schema::SHIPPING_COUNTRY_COLUMN),
            payment_method_counts: self
                .aggregation
                .category_counts(&view, schema::PAYMENT_METHOD_COLUMN),
            monthly_sales: series.sales,
            monthly_orders: series.orders,
            monthly_avg_values: series.averages,
            top_skus,
        })
    }

    /// Filtered page of rows in load order
    pub fn get_filtered_page(
        &self,
        criteria: &FilterCriteria,
        skip: i64,
        limit: i64,
    ) -> SalesdashResult<Vec<Map<String, Value>>> {
        let dataset = self.store.read();
        let view = self.filter.apply(&dataset, criteria);
        view.page_json(skip, limit)
    }

    /// Reduced stats bundle for the filtered subset
    pub fn get_filtered_stats(&self, criteria: &FilterCriteria) -> SalesdashResult<FilteredStats> {
        let dataset = self.store.read();
        let view = self.filter.apply(&dataset, criteria);
        let kpis = self.aggregation.kpis(&view);

        Ok(FilteredStats {
            total_count: kpis.total_records,
            total_sales: kpis.total_sales,
            avg_order_value: kpis.avg_order_value,
            total_quantity: kpis.total_quantity,
            state_breakdown: self.aggregation.sum_by_state(&view),
            status_breakdown: self.aggregation.category_counts(&view, schema::STATUS_COLUMN),
        })
    }

    /// Ordered column names as currently known
    pub fn get_columns(&self) -> Vec<String> {
        self.store.column_names()
    }

    /// Filter options per fixed dimension, "All" first
    pub fn get_filter_options(&self) -> Map<String, Value> {
        let dataset = self.store.read();
        let mut options = Map::new();
        for (column, values) in self.aggregation.filter_options(&dataset) {
            options.insert(column, Value::from(values));
        }
        options
    }

    /// Add a categorical column with a default value on every row
    pub fn add_column(&self, name: &str, default_value: &str) -> SalesdashResult<()> {
        self.store.add_column(name, default_value)
    }

    /// Current row count, for liveness reporting
    pub fn record_count(&self) -> usize {
        self.store.read().len()
    }
}
