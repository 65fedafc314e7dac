//! # Salesdash Core Library
//!
//! In-memory sales-transaction table and the query engine over it, shared
//! by the Salesdash HTTP service and its tests.
//!
//! ## Features
//!
//! - **Cells & Coercion**: Typed cells with best-effort coercion from raw text
//! - **Dataset Storage**: Versioned table with single-writer mutation and pagination
//! - **Filtering**: Optional criteria compiled into read-only row views
//! - **Aggregation**: KPIs, categorical breakdowns, top-N and monthly series
//! - **Facade**: One composition point per transport operation
//!
//! ## Architecture
//!
//! The engine never touches the network or the filesystem. It consumes raw
//! row mappings from whatever loads them and hands back plain maps, lists
//! and scalars, so the transport layer stays a thin collaborator.

pub mod aggregate;
pub mod cell;
pub mod dataset;
pub mod error;
pub mod facade;
pub mod filter;
pub mod schema;
pub mod store;

// Re-export commonly used types
pub use aggregate::{AggregationEngine, Kpis, MonthlySeries};
pub use cell::CellValue;
pub use dataset::{Dataset, RawRow, Record};
pub use error::{SalesdashError, SalesdashResult};
pub use facade::{FilteredStats, FullStats, QueryFacade};
pub use filter::{FilterCriteria, FilterEngine, View};
pub use schema::{ColumnKind, Schema};
pub use store::DatasetStore;

/// Input format for date cells and textual date filter bounds (day/month/year)
pub const DATE_INPUT_FORMAT: &str = "%d/%m/%Y";

/// Rendering format for timestamp cells in row output
pub const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Month bucket label format for the time series
pub const MONTH_LABEL_FORMAT: &str = "%Y-%m";

/// Number of SKUs reported by the top-SKU aggregate
pub const TOP_SKU_COUNT: usize = 10;

/// Page size applied when a caller does not pass a limit
pub const DEFAULT_PAGE_LIMIT: i64 = 100;
