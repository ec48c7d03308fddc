//! Active-deployment registry
//!
//! Tracks, per repository and environment, which deployment is currently
//! active. The whole document is loaded, mutated and rewritten under one
//! process-wide lock, so promotions are serialized regardless of the key they
//! touch.

use std::collections::BTreeMap;

use openapi_client::models::DeploymentState;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::deploy::artifacts::Artifacts;
use crate::deploy::context::DeploymentContext;
use crate::deploy::reporter::{announce, StatusReporter};
use crate::deploy::status::DeploymentStatus;
use crate::errors::NavisError;
use crate::filesys::file::File;

/// The active deployment of one repository/environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDeployment {
    pub active: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_url: Option<String>,
}

/// repository -> environment -> active deployment
pub type RegistryData = BTreeMap<String, BTreeMap<String, ActiveDeployment>>;

/// Durable registry backed by a single JSON file
pub struct ActiveDeploymentRegistry {
    file: File,
    lock: Mutex<()>,
}

impl ActiveDeploymentRegistry {
    /// Open the registry, creating an empty document if the file does not exist
    pub async fn open(file: File) -> Result<Self, NavisError> {
        if !file.exists().await {
            info!("Creating empty registry at {}", file.path().display());
            file.write_json(&RegistryData::new()).await?;
        }

        Ok(Self {
            file,
            lock: Mutex::new(()),
        })
    }

    /// Read the current registry contents
    pub async fn snapshot(&self) -> Result<RegistryData, NavisError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Active deployment of a repository/environment
    pub async fn active(
        &self,
        repository: &str,
        environment: &str,
    ) -> Result<Option<ActiveDeployment>, NavisError> {
        let data = self.snapshot().await?;
        Ok(data
            .get(repository)
            .and_then(|envs| envs.get(environment))
            .cloned())
    }

    /// Mark `context`'s deployment active for its repository/environment.
    ///
    /// A different deployment that was active before is reported `inactive`
    /// (while the lock is held) and its id is returned. A registry that cannot
    /// be read aborts the promotion. A registry that cannot be written is
    /// logged only; the superseded deployment has already been notified.
    pub async fn promote(
        &self,
        context: &DeploymentContext,
        new_env_url: Option<&str>,
        reporter: &dyn StatusReporter,
        artifacts: &Artifacts,
    ) -> Result<Option<u64>, NavisError> {
        let _guard = self.lock.lock().await;

        let mut data = self.load().await.map_err(|e| {
            error!("Cannot read registry file: {}", e);
            e
        })?;

        let environments = data.entry(context.repository.clone()).or_default();

        let mut superseded = None;
        if let Some(current) = environments.get_mut(&context.environment) {
            if current.active != context.deployment_id {
                let previous = current.active;
                let status = DeploymentStatus::new(DeploymentState::Inactive)
                    .with_log_url(artifacts.log_url(&context.internal_id_for(previous)))
                    .with_environment_url(current.env_url.take());

                debug!(
                    "Deployment {} supersedes {} on {}/{}",
                    context.deployment_id, previous, context.repository, context.environment
                );
                announce(reporter, previous, &context.repository, &status).await;
                superseded = Some(previous);
            }
        }

        let entry = environments
            .entry(context.environment.clone())
            .or_insert_with(|| ActiveDeployment {
                active: context.deployment_id,
                env_url: None,
            });
        entry.active = context.deployment_id;
        if let Some(url) = new_env_url.filter(|url| !url.is_empty()) {
            entry.env_url = Some(url.to_string());
        }

        if let Err(e) = self.file.write_json(&data).await {
            error!("Cannot write registry file: {}", e);
        }

        Ok(superseded)
    }

    async fn load(&self) -> Result<RegistryData, NavisError> {
        self.file.read_json().await.map_err(|e| {
            NavisError::RegistryError(format!("{}: {}", self.file.path().display(), e))
        })
    }
}
