//! One-shot deployment order sent from the command line

use std::collections::HashMap;

use openapi_client::models::CreateDeploymentRequest;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::errors::NavisError;
use crate::http::client::HttpClient;
use crate::storage::settings::{Settings, DEFAULT_API_BASE_URL};

/// Ref deployed when `--ref` is not given
pub const DEFAULT_REF: &str = "master";

/// A deployment order built from `--key=value` arguments
#[derive(Debug)]
pub struct TriggerOrder {
    pub repository: String,
    pub environment: String,
    pub git_ref: String,
    pub api_base_url: String,
    token: SecretString,
}

impl TriggerOrder {
    /// Whether the order can be built without a settings file
    pub fn needs_settings(cli_args: &HashMap<String, String>) -> bool {
        !cli_args.contains_key("token")
    }

    /// Build an order. `--token` wins over the repository token from
    /// `settings`; settings are only required when no token is passed.
    pub fn from_args(
        cli_args: &HashMap<String, String>,
        settings: Option<&Settings>,
    ) -> Result<Self, NavisError> {
        let repository = cli_args
            .get("repo")
            .cloned()
            .ok_or_else(|| NavisError::ValidationError("--repo=<owner/repo> is required".into()))?;
        let environment = cli_args
            .get("environment")
            .cloned()
            .ok_or_else(|| NavisError::ValidationError("--environment=<name> is required".into()))?;
        let git_ref = cli_args
            .get("ref")
            .cloned()
            .unwrap_or_else(|| DEFAULT_REF.to_string());

        let token = match cli_args.get("token") {
            Some(token) => SecretString::from(token.clone()),
            None => settings
                .and_then(|s| s.repo(&repository))
                .and_then(|r| r.token.as_ref())
                .map(|token| SecretString::from(token.expose_secret().to_owned()))
                .ok_or_else(|| {
                    NavisError::ValidationError(format!(
                        "No token for {}; pass --token=<token>",
                        repository
                    ))
                })?,
        };

        let api_base_url = cli_args
            .get("api-url")
            .map(|url| url.trim_end_matches('/').to_string())
            .or_else(|| settings.map(|s| s.api_base_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Ok(Self {
            repository,
            environment,
            git_ref,
            api_base_url,
            token,
        })
    }

    /// Ask the deployments API to create the deployment
    pub async fn send(&self) -> Result<(), NavisError> {
        let client = HttpClient::new(&self.api_base_url)?;
        let request = CreateDeploymentRequest {
            git_ref: self.git_ref.clone(),
            environment: self.environment.clone(),
        };
        client
            .create_deployment(&self.repository, &self.token, &request)
            .await?;
        info!(
            "Deployment of {}@{} to {} requested",
            self.repository, self.git_ref, self.environment
        );
        Ok(())
    }
}
