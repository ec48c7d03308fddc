//! Storage layout configuration

use std::path::PathBuf;

use crate::errors::NavisError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;

/// Storage layout for the server
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Base directory for all storage
    pub base_dir: PathBuf,
}

impl StorageLayout {
    /// Create a new storage layout
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Active-deployment registry file
    pub fn registry_file(&self) -> File {
        File::new(self.base_dir.join("data.json"))
    }

    /// Deployment log directory, served under `/logs`
    pub fn logs_dir(&self) -> Dir {
        Dir::new(self.base_dir.join("logs"))
    }

    /// Deployment output directory, served under `/deployments`
    pub fn output_dir(&self) -> Dir {
        Dir::new(self.base_dir.join("output"))
    }

    /// Setup the storage layout (create directories)
    pub async fn setup(&self) -> Result<(), NavisError> {
        self.logs_dir().create().await?;
        self.output_dir().create().await?;
        Ok(())
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::new(".")
    }
}
