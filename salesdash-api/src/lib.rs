//! Salesdash API Service Library
//!
//! This library provides the HTTP surface of the sales analytics service,
//! including CSV ingestion, bearer-token authentication, and handlers over
//! the query facade.

// Core modules
pub mod auth;
pub mod config;
pub mod handlers;
pub mod loader;

// Re-export commonly used types
pub use config::ApiConfig;

use std::sync::Arc;

use salesdash_core::QueryFacade;

use crate::auth::AuthService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<QueryFacade>,
    pub auth: Arc<AuthService>,
    pub config: Arc<ApiConfig>,
}

/// Create the main application router
///
/// Everything except `/health` and `/token` sits behind the bearer-token
/// middleware.
pub fn create_router(state: AppState) -> axum::Router {
    use crate::handlers::*;
    use axum::middleware::from_fn_with_state;
    use axum::routing::{get, post};
    use tower::ServiceBuilder;
    use tower_http::{cors::CorsLayer, trace::TraceLayer};

    let protected = axum::Router::new()
        .route("/data", get(data_handler))
        .route("/stats", get(stats_handler))
        .route("/data/filter", get(filter_data_handler))
        .route("/filtered-stats", get(filtered_stats_handler))
        .route("/columns", get(columns_handler))
        .route("/filter-options", get(filter_options_handler))
        .route("/data/add-column", post(add_column_handler))
        .route_layer(from_fn_with_state(state.clone(), crate::auth::require_auth));

    axum::Router::new()
        .route("/health", get(health_handler))
        .route("/token", post(login_handler))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
