//! HTTP request handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use openapi_client::models::DeploymentEventPayload;
use openapi_server::models::{HealthResponse, HookResponse, VersionResponse};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::deploy::context::DeploymentContext;
use crate::server::signature::verify_signature;
use crate::server::state::ServerState;
use crate::utils::version_info;

pub const EVENT_HEADER: &str = "x-github-event";

const LANDING_PAGE: &str = r#"<html><body style="background: #221f1f; color: #fff; font-family: monospace;">
<div style="position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); text-align: center;">
<b>The naked man fears no pickpocket</b><br><i>Navis, a lightweight deployment server</i>
</div></body></html>"#;

fn respond(status: StatusCode, detail: &str) -> (StatusCode, Json<HookResponse>) {
    if status == StatusCode::OK {
        info!("{}", detail);
    } else {
        warn!("{} ({})", detail, status.as_u16());
    }
    (
        status,
        Json(HookResponse {
            status: status.as_u16(),
            detail: detail.to_string(),
        }),
    )
}

/// Webhook intake: validates a `deployment` event and schedules its worker
pub async fn deploy_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<HookResponse>) {
    info!("Received hook.");

    let json: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(json) => json,
        Err(_) => return respond(StatusCode::BAD_REQUEST, "Could not parse json."),
    };

    let event = match headers.get(EVENT_HEADER).and_then(|v| v.to_str().ok()) {
        Some(event) => event,
        None => return respond(StatusCode::BAD_REQUEST, "Missing X-GitHub-Event header"),
    };
    match event {
        "ping" => return respond(StatusCode::OK, "pong"),
        "deployment" => {}
        _ => {
            return respond(
                StatusCode::BAD_REQUEST,
                "This deployment server only supports deployment events",
            )
        }
    }

    let repo_name = match json.pointer("/repository/full_name").and_then(|v| v.as_str()) {
        Some(name) => name,
        None => {
            return respond(
                StatusCode::BAD_REQUEST,
                "Could not find repository name in request.",
            )
        }
    };
    let repo = match state.settings.repo(repo_name) {
        Some(repo) => repo,
        None => return respond(StatusCode::NOT_FOUND, "Repository not found in settings."),
    };

    if !verify_signature(&headers, &body, repo.secret.expose_secret()) {
        return respond(StatusCode::UNAUTHORIZED, "Invalid signature.");
    }

    let payload: DeploymentEventPayload = match serde_json::from_value(json) {
        Ok(payload) => payload,
        Err(_) => return respond(StatusCode::BAD_REQUEST, "Malformed deployment payload."),
    };

    let environment = payload.deployment.environment;
    let env_settings = match repo.environments.get(&environment) {
        Some(env) => env,
        None => {
            return respond(
                StatusCode::NOT_FOUND,
                "No script for this environment found.",
            )
        }
    };
    let token = match &repo.token {
        Some(token) => SecretString::from(token.expose_secret().to_owned()),
        None => return respond(StatusCode::INTERNAL_SERVER_ERROR, "Don't have a github token"),
    };

    let context = DeploymentContext {
        deployment_id: payload.deployment.id,
        command: env_settings.command.clone(),
        repository: repo.name.clone(),
        git_ref: payload.deployment.git_ref,
        environment,
        auto_inactive: env_settings.auto_inactive,
        output_mode: env_settings.output,
    };
    state.schedule(context, token);

    respond(StatusCode::OK, "Deployment successfully scheduled")
}

/// Landing page
pub async fn index_handler() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// Health check handler
pub async fn health_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "navis".to_string(),
        version: version.version,
        active_workers: state.workers.active(),
    })
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}
