//! HTTP server setup

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::options::ServerOptions;
use crate::errors::NavisError;
use crate::server::handlers::{deploy_handler, health_handler, index_handler, version_handler};
use crate::server::state::ServerState;

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    let logs = ServeDir::new(state.artifacts.logs_dir().path());
    let outputs = ServeDir::new(state.artifacts.output_dir().path());

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        // Webhook intake
        .route("/deploy", post(deploy_handler))
        // Artifacts
        .nest_service("/logs", logs)
        .nest_service("/deployments", outputs)
        // State and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(JoinHandle<Result<(), NavisError>>, SocketAddr), NavisError> {
    let app = router(state);

    let addr = format!("{}:{}", options.host, options.port);
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| NavisError::ServerError(e.to_string()))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| NavisError::ServerError(e.to_string()))?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| NavisError::ServerError(e.to_string()))
    });

    Ok((handle, local_addr))
}
