//! Status reporting

use std::sync::Arc;

use async_trait::async_trait;
use openapi_client::models::DeploymentStatusRequest;
use secrecy::SecretString;
use tracing::{error, info};

use crate::deploy::status::DeploymentStatus;
use crate::errors::NavisError;
use crate::http::client::HttpClient;

/// Publishes deployment state transitions to the tracking API
#[async_trait]
pub trait StatusReporter: Send + Sync {
    /// Send one status for a deployment. Implementations do not retry.
    async fn report(
        &self,
        deployment_id: u64,
        repository: &str,
        status: &DeploymentStatus,
    ) -> Result<(), NavisError>;
}

/// Report a status and log the outcome. A failed report is not escalated.
pub async fn announce(
    reporter: &dyn StatusReporter,
    deployment_id: u64,
    repository: &str,
    status: &DeploymentStatus,
) -> bool {
    match reporter.report(deployment_id, repository, status).await {
        Ok(()) => {
            info!(
                "Successfully set state {} for deployment {}",
                status.state, deployment_id
            );
            true
        }
        Err(e) => {
            error!(
                "Error while setting state {} for deployment {}: {}",
                status.state, deployment_id, e
            );
            false
        }
    }
}

/// Reporter backed by the deployments REST API, authenticated with one
/// repository's token
pub struct ApiStatusReporter {
    http_client: Arc<HttpClient>,
    token: SecretString,
}

impl ApiStatusReporter {
    pub fn new(http_client: Arc<HttpClient>, token: SecretString) -> Self {
        Self { http_client, token }
    }
}

#[async_trait]
impl StatusReporter for ApiStatusReporter {
    async fn report(
        &self,
        deployment_id: u64,
        repository: &str,
        status: &DeploymentStatus,
    ) -> Result<(), NavisError> {
        let request = DeploymentStatusRequest::from(status);
        self.http_client
            .create_deployment_status(repository, deployment_id, &self.token, &request)
            .await
    }
}
