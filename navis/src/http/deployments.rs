//! Deployment API calls

use openapi_client::models::{CreateDeploymentRequest, DeploymentStatusRequest};
use reqwest::StatusCode;
use secrecy::SecretString;
use tracing::error;

use crate::errors::NavisError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// Create a deployment status. Anything but `201 Created` is an error.
    pub async fn create_deployment_status(
        &self,
        repository: &str,
        deployment_id: u64,
        token: &SecretString,
        status: &DeploymentStatusRequest,
    ) -> Result<(), NavisError> {
        let path = format!("/repos/{}/deployments/{}/statuses", repository, deployment_id);
        let response = self.post(&path, token, status).await?;

        if response.status() != StatusCode::CREATED {
            let code = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NavisError::ReportError(format!("{}: {}", code, body)));
        }

        Ok(())
    }

    /// Request a new deployment of `git_ref` to an environment
    pub async fn create_deployment(
        &self,
        repository: &str,
        token: &SecretString,
        request: &CreateDeploymentRequest,
    ) -> Result<(), NavisError> {
        let path = format!("/repos/{}/deployments", repository);
        let response = self.post(&path, token, request).await?;

        if !response.status().is_success() {
            let code = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Deployment request rejected: {} - {}", code, body);
            return Err(NavisError::ReportError(format!("{}: {}", code, body)));
        }

        Ok(())
    }
}
