//! Settings file management

use std::collections::HashMap;
use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::deploy::context::OutputMode;
use crate::errors::NavisError;
use crate::logs::LogLevel;

/// Server settings
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Externally reachable base URL used in log and download links
    pub public_hostname: String,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on; an ephemeral port is chosen when absent
    #[serde(default)]
    pub port: Option<u16>,

    /// Directory holding `logs/`, `output/` and the registry file
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Base URL of the deployment-tracking API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit JSON logs
    #[serde(default)]
    pub log_json: bool,

    /// Directory for rolling log files
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Configured repositories
    #[serde(default)]
    pub repos: Vec<RepoSettings>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Deployments API used when none is configured
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

/// Per-repository settings
#[derive(Debug, Deserialize)]
pub struct RepoSettings {
    /// Repository name in `owner/repo` form
    pub name: String,

    /// Webhook HMAC secret
    pub secret: SecretString,

    /// API bearer token used for status reports
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Environment name to deployment settings
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentSettings>,
}

/// Per-environment deployment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSettings {
    /// Shell command run for each deployment
    pub command: String,

    /// Mark the previously active deployment inactive on completion
    #[serde(default)]
    pub auto_inactive: bool,

    /// How the deployment script reports an environment URL
    #[serde(default)]
    pub output: OutputMode,
}

impl Settings {
    /// Parse and validate settings from a JSON string
    pub fn from_json(contents: &str) -> Result<Self, NavisError> {
        let mut settings: Settings = serde_json::from_str(contents)
            .map_err(|e| NavisError::SettingsError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub async fn load(path: &std::path::Path) -> Result<Self, NavisError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            NavisError::SettingsError(format!("Unable to open {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    fn validate(&mut self) -> Result<(), NavisError> {
        for (field, value) in [
            ("public_hostname", &self.public_hostname),
            ("api_base_url", &self.api_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| NavisError::SettingsError(format!("Invalid {}: {}", field, e)))?;
        }
        self.public_hostname = self.public_hostname.trim_end_matches('/').to_string();
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Find the settings of a repository by its full name
    pub fn repo(&self, name: &str) -> Option<&RepoSettings> {
        self.repos.iter().find(|r| r.name == name)
    }
}
