//! HTTP client implementation

use std::time::Duration;

use reqwest::{header, Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::errors::NavisError;

/// Media type requested from the deployments API
pub const ACCEPT_DEPLOYMENTS: &str = "application/vnd.github.flash-preview+json";

/// HTTP client for the deployment-tracking API, shared by every worker
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str) -> Result<Self, NavisError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(ACCEPT_DEPLOYMENTS),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("navis/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Make a bearer-authenticated POST request with a JSON body.
    ///
    /// The response is returned as-is; interpreting the status is up to the caller.
    pub async fn post<B: Serialize>(
        &self,
        path: &str,
        token: &SecretString,
        body: &B,
    ) -> Result<Response, NavisError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.expose_secret())
            .json(body)
            .send()
            .await?;

        Ok(response)
    }
}
