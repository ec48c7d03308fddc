//! Webhook intake and artifact serving tests

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use navis::app::state::AppState;
use navis::deploy::ident::InternalDeploymentId;
use navis::server::serve::router;
use navis::server::signature::sign_sha1;
use navis::server::state::ServerState;
use navis::storage::layout::StorageLayout;
use navis::storage::settings::Settings;
use tower::ServiceExt;

use crate::common::MockApi;

const SECRET: &str = "hook-secret";

struct Server {
    _tmp: tempfile::TempDir,
    layout: StorageLayout,
    state: Arc<ServerState>,
}

impl Server {
    async fn new(api_base_url: &str) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings::from_json(
            &serde_json::json!({
                "public_hostname": "https://deploy.test",
                "api_base_url": api_base_url,
                "storage_dir": tmp.path(),
                "repos": [
                    {
                        "name": "acme/app",
                        "secret": SECRET,
                        "token": "ghp_test",
                        "environments": {
                            "prod": {"command": "exit 0", "auto_inactive": true}
                        }
                    },
                    {
                        "name": "acme/tokenless",
                        "secret": SECRET,
                        "environments": {"prod": {"command": "exit 0"}}
                    }
                ]
            })
            .to_string(),
        )
        .unwrap();

        let layout = StorageLayout::new(tmp.path());
        let app_state = AppState::init(Arc::new(settings), &layout).await.unwrap();
        Self {
            _tmp: tmp,
            layout,
            state: Arc::new(ServerState::from_app_state(&app_state)),
        }
    }

    fn router(&self) -> Router {
        router(self.state.clone())
    }
}

fn deployment_body(repo: &str, env: &str, id: u64) -> String {
    serde_json::json!({
        "action": "created",
        "deployment": {"id": id, "ref": "main", "environment": env},
        "repository": {"full_name": repo}
    })
    .to_string()
}

fn hook(event: Option<&str>, body: &str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/deploy");
    if let Some(event) = event {
        builder = builder.header("X-GitHub-Event", event);
    }
    if let Some(signature) = signature {
        builder = builder.header("X-Hub-Signature", signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn signed(body: &str) -> Option<String> {
    Some(sign_sha1(SECRET, body.as_bytes()).unwrap())
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_ping_answers_pong() {
    let server = Server::new("http://127.0.0.1:9").await;
    let (status, body) = send(server.router(), hook(Some("ping"), "{}", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"status": 200, "detail": "pong"}));
}

#[tokio::test]
async fn test_rejected_hooks() {
    let server = Server::new("http://127.0.0.1:9").await;
    let body = deployment_body("acme/app", "prod", 42);

    let cases = vec![
        (hook(Some("deployment"), "{not json", None), StatusCode::BAD_REQUEST),
        (hook(None, &body, signed(&body)), StatusCode::BAD_REQUEST),
        (hook(Some("push"), &body, signed(&body)), StatusCode::BAD_REQUEST),
        (hook(Some("deployment"), "{}", None), StatusCode::BAD_REQUEST),
        (
            hook(
                Some("deployment"),
                &deployment_body("acme/unknown", "prod", 42),
                signed(&body),
            ),
            StatusCode::NOT_FOUND,
        ),
        (hook(Some("deployment"), &body, None), StatusCode::UNAUTHORIZED),
        (
            hook(Some("deployment"), &body, Some("sha1=deadbeef".to_string())),
            StatusCode::UNAUTHORIZED,
        ),
    ];

    for (request, expected) in cases {
        let (status, json) = send(server.router(), request).await;
        assert_eq!(status, expected, "{}", json);
        assert_eq!(json["status"], expected.as_u16());
    }
}

#[tokio::test]
async fn test_unknown_environment_and_missing_token() {
    let server = Server::new("http://127.0.0.1:9").await;

    let body = deployment_body("acme/app", "staging", 42);
    let (status, json) = send(server.router(), hook(Some("deployment"), &body, signed(&body))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["detail"], "No script for this environment found.");

    let body = deployment_body("acme/tokenless", "prod", 42);
    let (status, json) = send(server.router(), hook(Some("deployment"), &body, signed(&body))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["detail"], "Don't have a github token");
}

#[tokio::test]
async fn test_deployment_is_scheduled_and_reported() {
    let api = MockApi::start(StatusCode::CREATED).await;
    let server = Server::new(&api.base_url()).await;
    let body = deployment_body("acme/app", "prod", 42);

    let (status, json) = send(server.router(), hook(Some("deployment"), &body, signed(&body))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["detail"], "Deployment successfully scheduled");

    let received = api.wait_for(2).await;
    let log_url = format!(
        "https://deploy.test/logs/{}",
        InternalDeploymentId::derive("acme/app", "prod", 42)
    );
    assert_eq!(
        received[0].body,
        serde_json::json!({"state": "in_progress", "log_url": log_url})
    );
    assert_eq!(
        received[1].body,
        serde_json::json!({"state": "success", "log_url": log_url})
    );
    assert!(received.iter().all(|r| r.deployment_id == 42));
    assert!(received
        .iter()
        .all(|r| r.authorization.as_deref() == Some("Bearer ghp_test")));

    // The registry is promoted before the final status is sent
    let active = server.state.registry.active("acme/app", "prod").await.unwrap();
    assert_eq!(active.unwrap().active, 42);
}

#[tokio::test]
async fn test_serves_logs_and_outputs() {
    let server = Server::new("http://127.0.0.1:9").await;
    std::fs::write(server.layout.logs_dir().path().join("abc"), "-- log\n").unwrap();
    std::fs::write(server.layout.output_dir().path().join("abc.zip"), "PK").unwrap();

    let response = server
        .router()
        .oneshot(Request::get("/logs/abc").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"-- log\n");

    let response = server
        .router()
        .oneshot(Request::get("/deployments/abc.zip").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = server
        .router()
        .oneshot(Request::get("/logs/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_workers() {
    let server = Server::new("http://127.0.0.1:9").await;
    let (status, json) = send(
        server.router(),
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["active_workers"], 0);
}
