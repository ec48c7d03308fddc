//! Deployment context

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::deploy::ident::InternalDeploymentId;

/// How a deployment script publishes its environment URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// No environment URL
    #[default]
    None,

    /// The script drops a file named after the output path (any extension)
    /// which is published as a download link
    File,

    /// The script writes the environment URL as the first line of the output file
    Url,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputMode::None => "none",
            OutputMode::File => "file",
            OutputMode::Url => "url",
        };
        f.write_str(s)
    }
}

/// A single triggered deployment job. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentContext {
    /// Deployment id assigned by the tracking API
    pub deployment_id: u64,

    /// Shell command to run
    pub command: String,

    /// Repository in `owner/repo` form
    pub repository: String,

    /// Git ref being deployed
    pub git_ref: String,

    /// Target environment
    pub environment: String,

    /// Supersede the previously active deployment on completion
    pub auto_inactive: bool,

    pub output_mode: OutputMode,
}

impl DeploymentContext {
    /// Internal identifier of this deployment
    pub fn internal_id(&self) -> InternalDeploymentId {
        self.internal_id_for(self.deployment_id)
    }

    /// Internal identifier of another deployment on the same repository/environment
    pub fn internal_id_for(&self, deployment_id: u64) -> InternalDeploymentId {
        InternalDeploymentId::derive(&self.repository, &self.environment, deployment_id)
    }
}
