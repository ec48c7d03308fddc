//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info};

use crate::app::options::AppOptions;
use crate::app::state::AppState;
use crate::errors::NavisError;
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::storage::settings::Settings;

/// Run the deployment server until `shutdown_signal` resolves
pub async fn run(
    settings: Arc<Settings>,
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), NavisError> {
    info!("Initializing Navis...");

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

    let app_state = AppState::init(settings, &options.layout).await?;
    let server_state = Arc::new(ServerState::from_app_state(&app_state));

    let (server_handle, addr) = serve(&options.server, server_state, async move {
        let _ = shutdown_rx.recv().await;
    })
    .await?;
    info!("Listening on {}", addr);

    shutdown_signal.await;
    info!("Shutdown signal received, shutting down...");
    let _ = shutdown_tx.send(());

    // Deployment workers are detached; only the listener is drained.
    match tokio::time::timeout(options.max_shutdown_delay, server_handle).await {
        Ok(joined) => joined.map_err(|e| NavisError::ServerError(e.to_string()))??,
        Err(_) => {
            error!(
                "Shutdown timed out after {:?}, forcing shutdown...",
                options.max_shutdown_delay
            );
        }
    }

    if app_state.workers.active() > 0 {
        info!(
            "Abandoning {} running deployment(s)",
            app_state.workers.active()
        );
    }

    info!("Shutdown complete");
    Ok(())
}
