//! API router configuration.

use std::future::Future;

use axum::{
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    get_output, get_raw, get_status, health, post_input, post_reset, post_resize, AppState,
};
use crate::error::ShellMirrorError;

/// Create the API router with a fresh terminal and no shell attached.
pub fn create_router() -> Router {
    create_router_with_state(AppState::default())
}

/// Create the API router with custom state.
pub fn create_router_with_state(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/output", get(get_output))
        .route("/raw", get(get_raw))
        .route("/input", post(post_input))
        .route("/resize", post(post_resize))
        .route("/reset", post(post_reset))
        .route("/status", get(get_status));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Start the API server with a fresh state, running until the process exits.
pub async fn serve(config: ServerConfig) -> crate::Result<()> {
    serve_with_state(config, AppState::default(), std::future::pending()).await
}

/// Start the API server with custom state.
///
/// Stops accepting connections once `shutdown` resolves and returns after
/// in-flight requests finish.
pub async fn serve_with_state<F>(
    config: ServerConfig,
    state: AppState,
    shutdown: F,
) -> crate::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.bind_address();
    let router = create_router_with_state(state);

    tracing::info!("Starting shell-mirror API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(ShellMirrorError::Io)?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ShellMirrorError::Io(std::io::Error::other(e.to_string())))?;

    tracing::info!("API server stopped");
    Ok(())
}
