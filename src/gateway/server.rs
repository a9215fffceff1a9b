//! HTTP server
//!
//! Builds the hub, the router and the listener, and hands back a
//! [`ServerHandle`] that shuts everything down when dropped.

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, Mutex};
use tower_http::cors::{Any, CorsLayer};

use super::config::ServerConfig;
use super::error::GatewayError;
use super::handlers::{health_handler, log_handler, mcp_post_handler};
use super::state::GatewayAppState;
use super::ticker::HubTicker;
use crate::bridge::{ExerciseHub, HubServices, LogEventSink, PublishedTools};
use crate::exercise::SystemClock;
use crate::storage::SqliteStore;

/// Server control handle
pub struct ServerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// Port actually bound
    port: u16,
    hub: Arc<Mutex<ExerciseHub>>,
}

impl ServerHandle {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn hub(&self) -> Arc<Mutex<ExerciseHub>> {
        self.hub.clone()
    }

    /// Stop the server
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Calm Tools companion server
pub struct CalmServer {
    config: ServerConfig,
    data_dir: PathBuf,
}

impl CalmServer {
    pub fn new(config: ServerConfig, data_dir: PathBuf) -> Self {
        Self { config, data_dir }
    }

    /// Load `settings.yaml` from `data_dir` and apply environment overrides
    pub fn from_data_dir(data_dir: &Path) -> Self {
        let config = ServerConfig::load(data_dir).with_env_overrides();
        Self::new(config, data_dir.to_path_buf())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Open storage, build the hub and start serving
    ///
    /// `port` overrides the configured port; 0 binds an OS-assigned port.
    pub async fn start(&self, port: Option<u16>) -> Result<ServerHandle, GatewayError> {
        let port = port.unwrap_or(self.config.port);
        ServerConfig::validate_port(port).map_err(GatewayError::ConfigError)?;

        std::fs::create_dir_all(&self.data_dir).map_err(|e| {
            GatewayError::StartupError(format!(
                "Failed to create data directory {}: {}",
                self.data_dir.display(),
                e
            ))
        })?;
        let db_path = self.config.database_path(&self.data_dir);
        let store = SqliteStore::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Opened session database");

        let runtime = Handle::try_current()
            .map_err(|e| GatewayError::StartupError(format!("No tokio runtime: {}", e)))?;
        let published = PublishedTools::new();
        let context = published.clone();
        let locale = self.config.default_locale;

        let hub = Arc::new_cyclic(|weak| {
            Mutex::new(ExerciseHub::new(HubServices {
                clock: Arc::new(SystemClock),
                scheduler: Arc::new(HubTicker::new(runtime, weak.clone())),
                context: Arc::new(context),
                events: Arc::new(LogEventSink),
                breath_store: Arc::new(store.clone()),
                grounding_store: Arc::new(store),
                locale,
            }))
        });

        let state = GatewayAppState::new(hub.clone(), published, self.config.ui_dir.clone());
        let app = router(state);

        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                GatewayError::PortInUse(port)
            } else {
                GatewayError::StartupError(format!("Failed to bind to port {}: {}", port, e))
            }
        })?;
        let bound_port = listener.local_addr()?.port();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let graceful = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });

            if let Err(e) = graceful.await {
                tracing::error!(error = %e, "Server error");
            }
            tracing::info!("Server stopped");
        });

        tracing::info!(port = bound_port, "Calm Tools server listening on 127.0.0.1");

        Ok(ServerHandle {
            shutdown_tx: Some(shutdown_tx),
            port: bound_port,
            hub,
        })
    }

    /// Check whether a port can be bound
    pub async fn check_port_available(port: u16) -> bool {
        tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], port)))
            .await
            .is_ok()
    }
}

/// Routes and layers
pub fn router(state: GatewayAppState) -> Router {
    Router::new()
        .route("/mcp", post(mcp_post_handler))
        .route("/log", post(log_handler))
        .route("/api/health", get(health_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .with_state(state)
}
