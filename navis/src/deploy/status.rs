//! Deployment status transitions

use openapi_client::models::{DeploymentState, DeploymentStatusRequest};

/// A state transition to announce for a deployment. Never stored locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentStatus {
    pub state: DeploymentState,
    pub log_url: Option<String>,
    pub environment_url: Option<String>,
}

impl DeploymentStatus {
    pub fn new(state: DeploymentState) -> Self {
        Self {
            state,
            log_url: None,
            environment_url: None,
        }
    }

    pub fn with_log_url(mut self, url: impl Into<String>) -> Self {
        self.log_url = Some(url.into());
        self
    }

    pub fn with_environment_url(mut self, url: Option<String>) -> Self {
        self.environment_url = url;
        self
    }
}

impl From<&DeploymentStatus> for DeploymentStatusRequest {
    fn from(status: &DeploymentStatus) -> Self {
        DeploymentStatusRequest {
            state: status.state,
            log_url: status.log_url.clone(),
            environment_url: status.environment_url.clone(),
        }
    }
}
