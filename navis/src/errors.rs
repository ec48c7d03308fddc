//! Error types for Navis

use thiserror::Error;

/// Main error type for Navis
#[derive(Error, Debug)]
pub enum NavisError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Settings error: {0}")]
    SettingsError(String),

    #[error("Registry error: {0}")]
    RegistryError(String),

    #[error("Status report error: {0}")]
    ReportError(String),

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for NavisError {
    fn from(err: anyhow::Error) -> Self {
        NavisError::Internal(err.to_string())
    }
}
