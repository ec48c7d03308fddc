//! Log and output artifact locations

use std::path::PathBuf;

use crate::deploy::ident::InternalDeploymentId;
use crate::errors::NavisError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;
use crate::storage::layout::StorageLayout;

/// Resolves artifact paths on disk and their public URLs
#[derive(Debug, Clone)]
pub struct Artifacts {
    layout: StorageLayout,
    public_hostname: String,
}

impl Artifacts {
    pub fn new(layout: StorageLayout, public_hostname: &str) -> Self {
        Self {
            layout,
            public_hostname: public_hostname.trim_end_matches('/').to_string(),
        }
    }

    pub fn logs_dir(&self) -> Dir {
        self.layout.logs_dir()
    }

    pub fn output_dir(&self) -> Dir {
        self.layout.output_dir()
    }

    /// Log file of a deployment
    pub fn log_file(&self, id: &InternalDeploymentId) -> File {
        self.layout.logs_dir().file(id.as_str())
    }

    /// Output file handed to the deployment script. The script may create it
    /// with an extension in `file` output mode.
    pub fn output_file(&self, id: &InternalDeploymentId) -> File {
        self.layout.output_dir().file(id.as_str())
    }

    /// Public URL of a deployment log
    pub fn log_url(&self, id: &InternalDeploymentId) -> String {
        format!("{}/logs/{}", self.public_hostname, id)
    }

    /// Public download URL of a file in the output directory
    pub fn download_url(&self, file_name: &str) -> String {
        format!("{}/deployments/{}", self.public_hostname, file_name)
    }

    /// Absolute form of an artifact path, as exported to the deployment script
    pub fn absolute(file: &File) -> Result<PathBuf, NavisError> {
        std::path::absolute(file.path()).map_err(|e| {
            NavisError::ArtifactError(format!("Cannot resolve {}: {}", file.path().display(), e))
        })
    }
}
