//! HTTP server wiring
//!
//! Builds the shared state, layers CORS and request tracing over the API
//! router, and serves until the shutdown future resolves.

pub mod api;

pub use api::{create_router, ApiResponse};

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::scheduler::SyncScheduler;
use crate::storage::SharedInventoryStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<SyncScheduler>,
    pub store: SharedInventoryStore,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(scheduler: Arc<SyncScheduler>, store: SharedInventoryStore) -> Self {
        Self {
            scheduler,
            store,
            start_time: Instant::now(),
        }
    }
}

/// Serve the API until `shutdown` resolves.
pub async fn serve(
    config: &ServerConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind {}: {e}", config.bind_addr)))?;

    tracing::info!(addr = %config.bind_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
