//! Server state

use std::sync::Arc;

use openapi_client::models::DeploymentState;
use secrecy::SecretString;
use tokio::task::JoinHandle;

use crate::app::state::{AppState, WorkerTracker};
use crate::deploy::artifacts::Artifacts;
use crate::deploy::context::DeploymentContext;
use crate::deploy::executor::{spawn, DeploymentWorker};
use crate::deploy::registry::ActiveDeploymentRegistry;
use crate::deploy::reporter::ApiStatusReporter;
use crate::http::client::HttpClient;
use crate::storage::settings::Settings;

/// Server state shared across handlers
pub struct ServerState {
    pub settings: Arc<Settings>,
    pub http_client: Arc<HttpClient>,
    pub registry: Arc<ActiveDeploymentRegistry>,
    pub artifacts: Arc<Artifacts>,
    pub workers: Arc<WorkerTracker>,
}

impl ServerState {
    pub fn from_app_state(app_state: &AppState) -> Self {
        Self {
            settings: app_state.settings.clone(),
            http_client: app_state.http_client.clone(),
            registry: app_state.registry.clone(),
            artifacts: app_state.artifacts.clone(),
            workers: app_state.workers.clone(),
        }
    }

    /// Start a detached worker for `context`, reporting with `token`
    pub fn schedule(
        &self,
        context: DeploymentContext,
        token: SecretString,
    ) -> JoinHandle<DeploymentState> {
        let reporter = Arc::new(ApiStatusReporter::new(self.http_client.clone(), token));
        let worker = DeploymentWorker::new(
            context,
            reporter,
            self.registry.clone(),
            self.artifacts.clone(),
        );
        spawn(worker, self.workers.clone())
    }
}
