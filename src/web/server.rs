//! Web server implementation
//!
//! Wires shared state into the API router and runs it on the configured
//! bind address.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::exclusions::ExclusionStore;
use crate::selection::CycleCursor;

use super::api::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
///
/// The catalog is immutable and shared plainly; the mutable pieces each get
/// their own lock so an exclusion toggle never waits on a config read.
/// Handlers that take more than one lock acquire them in a fixed order:
/// config, then exclusions, then cursor.
#[derive(Clone)]
pub struct AppState {
    /// Character catalog
    pub catalog: Arc<Catalog>,

    /// Live configuration
    pub config: Arc<Mutex<Config>>,

    /// Exclusion store
    pub exclusions: Arc<Mutex<ExclusionStore>>,

    /// Cycle cursor
    pub cursor: Arc<Mutex<CycleCursor>>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Build state from loaded configuration, opening the persistence files
    /// the config points at
    pub fn new(config: Config, catalog: Catalog) -> Self {
        let exclusions = ExclusionStore::load(&config.selection.exclusions_file);
        let cursor = CycleCursor::new(&config.selection.cycle_file);
        Self {
            catalog: Arc::new(catalog),
            config: Arc::new(Mutex::new(config)),
            exclusions: Arc::new(Mutex::new(exclusions)),
            cursor: Arc::new(Mutex::new(cursor)),
            start_time: Instant::now(),
        }
    }
}

// ============================================================================
// Web Server
// ============================================================================

/// Control panel HTTP server
pub struct WebServer {
    bind_address: String,
    state: AppState,
}

impl WebServer {
    pub fn new(bind_address: String, state: AppState) -> Self {
        Self {
            bind_address,
            state,
        }
    }

    /// Build the router with all routes and layers
    pub fn build_router(&self) -> Router {
        create_router(self.state.clone())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until the shutdown future resolves
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let router = self.build_router();

        tracing::info!(address = %self.bind_address, "Starting control panel");

        let listener = tokio::net::TcpListener::bind(&self.bind_address)
            .await
            .map_err(|e| Error::config(format!("cannot bind {}: {e}", self.bind_address)))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}
