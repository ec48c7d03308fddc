//! Application state management

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::deploy::artifacts::Artifacts;
use crate::deploy::registry::ActiveDeploymentRegistry;
use crate::errors::NavisError;
use crate::http::client::HttpClient;
use crate::storage::layout::StorageLayout;
use crate::storage::settings::Settings;

/// Counts deployment workers currently running
#[derive(Debug, Default)]
pub struct WorkerTracker {
    active: AtomicUsize,
}

impl WorkerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running worker until the returned guard is dropped
    pub fn enter(self: &Arc<Self>) -> ActiveWorker {
        self.active.fetch_add(1, Ordering::SeqCst);
        ActiveWorker {
            tracker: self.clone(),
        }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// Guard for one running worker
pub struct ActiveWorker {
    tracker: Arc<WorkerTracker>,
}

impl Drop for ActiveWorker {
    fn drop(&mut self) {
        self.tracker.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Main application state
pub struct AppState {
    /// Loaded settings
    pub settings: Arc<Settings>,

    /// Client for the deployment-tracking API
    pub http_client: Arc<HttpClient>,

    /// Active-deployment registry
    pub registry: Arc<ActiveDeploymentRegistry>,

    /// Log/output artifact locations
    pub artifacts: Arc<Artifacts>,

    /// Running workers
    pub workers: Arc<WorkerTracker>,
}

impl AppState {
    /// Initialize application state: storage directories, registry file, API client
    pub async fn init(settings: Arc<Settings>, layout: &StorageLayout) -> Result<Self, NavisError> {
        info!("Initializing application state...");

        layout.setup().await?;
        let registry = Arc::new(ActiveDeploymentRegistry::open(layout.registry_file()).await?);
        let http_client = Arc::new(HttpClient::new(&settings.api_base_url)?);
        let artifacts = Arc::new(Artifacts::new(layout.clone(), &settings.public_hostname));

        Ok(Self {
            settings,
            http_client,
            registry,
            artifacts,
            workers: Arc::new(WorkerTracker::new()),
        })
    }
}
