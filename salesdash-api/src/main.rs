use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};

use salesdash_api::auth::AuthService;
use salesdash_api::{create_router, ApiConfig, AppState};
use salesdash_core::{DatasetStore, QueryFacade};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Arc::new(ApiConfig::load()?);
    info!(
        bind_address = %config.bind_address,
        csv_path = %config.data.csv_path,
        "loaded configuration"
    );

    // Load the dataset; a missing or broken CSV means an empty store,
    // not a dead service
    let store = Arc::new(DatasetStore::new());
    match salesdash_api::loader::load_csv(Path::new(&config.data.csv_path)) {
        Ok(rows) => {
            let loaded = store.load(&rows);
            info!(rows = loaded, "dataset ready");
        }
        Err(err) => {
            warn!(
                "could not load {}: {}; starting with an empty dataset",
                config.data.csv_path, err
            );
        }
    }

    // Create shared state
    let state = AppState {
        facade: Arc::new(QueryFacade::new(store)),
        auth: Arc::new(AuthService::new(
            config.auth.username.clone(),
            config.auth.password.clone(),
            config.auth.token_ttl_minutes,
        )),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = TcpListener::bind(&config.bind_address).await?;
    let addr = listener.local_addr()?;
    info!("Salesdash API listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
