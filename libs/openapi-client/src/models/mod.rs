//! API models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Deployment status state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    InProgress,
    Success,
    Failure,
    Error,
    Inactive,
}

impl DeploymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentState::InProgress => "in_progress",
            DeploymentState::Success => "success",
            DeploymentState::Failure => "failure",
            DeploymentState::Error => "error",
            DeploymentState::Inactive => "inactive",
        }
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /repos/{owner}/{repo}/deployments/{id}/statuses`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatusRequest {
    pub state: DeploymentState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_url: Option<String>,
}

/// Body of `POST /repos/{owner}/{repo}/deployments`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeploymentRequest {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub environment: String,
}

/// Repository section of a webhook payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub full_name: String,
}

/// Deployment section of a `deployment` webhook payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRef {
    pub id: u64,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub environment: String,
}

/// Payload of a `deployment` webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentEventPayload {
    pub deployment: DeploymentRef,
    pub repository: RepositoryRef,
}
