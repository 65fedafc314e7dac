use axum::{
    extract::{Form, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use validator::Validate;

use salesdash_core::{
    FilterCriteria, FilteredStats, FullStats, SalesdashError, DEFAULT_PAGE_LIMIT,
};

use crate::auth::{LoginForm, TokenResponse};
use crate::AppState;

/// Map an engine error onto an HTTP response
///
/// Unauthorized responses carry the `WWW-Authenticate` challenge so
/// bearer-token clients know how to retry.
pub fn error_response(err: &SalesdashError) -> Response {
    let status = match err.category() {
        "duplicate_column" | "validation" | "parse" => StatusCode::BAD_REQUEST,
        "unauthorized" => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = Json(json!({
        "error": err.category(),
        "message": err.to_string(),
    }));
    if status == StatusCode::UNAUTHORIZED {
        (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
    } else {
        (status, body).into_response()
    }
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

/// Pagination window for the plain data endpoint
#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// Filter criteria plus pagination, straight from the query string
///
/// Kept flat rather than nesting `FilterCriteria` because the query-string
/// deserializer cannot flatten non-string fields like `min_total`.
#[derive(Debug, Deserialize)]
pub struct FilterQuery {
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
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl FilterQuery {
    pub fn into_criteria(self) -> FilterCriteria {
        FilterCriteria {
            status: self.status,
            delivery_status: self.delivery_status,
            country: self.country,
            province: self.province,
            state: self.state,
            payment_method: self.payment_method,
            min_total: self.min_total,
            max_total: self.max_total,
            from_date: self.from_date,
            to_date: self.to_date,
        }
    }
}

/// Parameters for the add-column endpoint
#[derive(Debug, Deserialize, Validate)]
pub struct AddColumnParams {
    #[validate(length(min = 1, max = 256, message = "column_name must be 1 to 256 characters"))]
    pub column_name: String,
    #[serde(default)]
    pub default_value: String,
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "salesdash-api",
        "records": state.facade.record_count(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Token endpoint, form-encoded credentials in, bearer token out
pub async fn login_handler(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, Response> {
    match state.auth.login(&form.username, &form.password) {
        Ok(token) => {
            info!(username = %form.username, "issued access token");
            Ok(Json(token))
        }
        Err(err) => {
            warn!(username = %form.username, "login failed");
            Err(error_response(&err))
        }
    }
}

/// Paged slice of the dataset as row objects
pub async fn data_handler(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Map<String, Value>>>, Response> {
    debug!(skip = params.skip, limit = params.limit, "data page requested");
    state
        .facade
        .get_page(params.skip, params.limit)
        .map(Json)
        .map_err(|err| error_response(&err))
}

/// Full dataset statistics bundle
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<FullStats>, Response> {
    state
        .facade
        .get_full_stats()
        .map(Json)
        .map_err(|err| error_response(&err))
}

/// Paged slice of the rows matching the given criteria
pub async fn filter_data_handler(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Vec<Map<String, Value>>>, Response> {
    debug!("filter request: {:?}", query);
    let (skip, limit) = (query.skip, query.limit);
    let criteria = query.into_criteria();
    state
        .facade
        .get_filtered_page(&criteria, skip, limit)
        .map(Json)
        .map_err(|err| error_response(&err))
}

/// Statistics over the rows matching the given criteria
pub async fn filtered_stats_handler(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<FilteredStats>, Response> {
    let criteria = query.into_criteria();
    state
        .facade
        .get_filtered_stats(&criteria)
        .map(Json)
        .map_err(|err| error_response(&err))
}

/// Current column names in schema order
pub async fn columns_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.facade.get_columns())
}

/// Distinct values per filter dimension, each list led by "All"
pub async fn filter_options_handler(State(state): State<AppState>) -> Json<Value> {
    Json(Value::Object(state.facade.get_filter_options()))
}

/// Append a column with a default value on every row
pub async fn add_column_handler(
    State(state): State<AppState>,
    Query(params): Query<AddColumnParams>,
) -> Result<Json<Value>, Response> {
    if let Err(err) = params.validate() {
        warn!("add-column validation failed: {}", err);
        return Err(error_response(&SalesdashError::validation(err.to_string())));
    }

    match state
        .facade
        .add_column(&params.column_name, &params.default_value)
    {
        Ok(()) => {
            info!(column = %params.column_name, "column added");
            Ok(Json(json!({
                "message": format!("Column '{}' added successfully", params.column_name)
            })))
        }
        Err(err) => {
            warn!(column = %params.column_name, "add-column failed: {}", err);
            Err(error_response(&err))
        }
    }
}
