//! Shared test fixtures

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use navis::deploy::artifacts::Artifacts;
use navis::deploy::context::{DeploymentContext, OutputMode};
use navis::deploy::reporter::StatusReporter;
use navis::deploy::status::DeploymentStatus;
use navis::errors::NavisError;
use navis::storage::layout::StorageLayout;
use openapi_client::models::DeploymentState;

/// One recorded status report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub deployment_id: u64,
    pub repository: String,
    pub status: DeploymentStatus,
}

/// Reporter that records every call instead of sending it
#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<Report>>,
    fail: bool,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reporter whose every call fails after being recorded
    pub fn failing() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }

    pub fn states(&self) -> Vec<(u64, DeploymentState)> {
        self.reports()
            .into_iter()
            .map(|r| (r.deployment_id, r.status.state))
            .collect()
    }

    pub fn inactive(&self) -> Vec<Report> {
        self.reports()
            .into_iter()
            .filter(|r| r.status.state == DeploymentState::Inactive)
            .collect()
    }
}

#[async_trait]
impl StatusReporter for RecordingReporter {
    async fn report(
        &self,
        deployment_id: u64,
        repository: &str,
        status: &DeploymentStatus,
    ) -> Result<(), NavisError> {
        self.reports.lock().unwrap().push(Report {
            deployment_id,
            repository: repository.to_string(),
            status: status.clone(),
        });
        if self.fail {
            return Err(NavisError::ReportError("503 Service Unavailable".to_string()));
        }
        Ok(())
    }
}

/// Temporary storage with `logs/` and `output/` created
pub async fn storage() -> (tempfile::TempDir, StorageLayout, Artifacts) {
    let tmp = tempfile::tempdir().unwrap();
    let layout = StorageLayout::new(tmp.path());
    layout.setup().await.unwrap();
    let artifacts = Artifacts::new(layout.clone(), "https://deploy.test");
    (tmp, layout, artifacts)
}

pub fn context(deployment_id: u64, command: &str) -> DeploymentContext {
    DeploymentContext {
        deployment_id,
        command: command.to_string(),
        repository: "acme/app".to_string(),
        git_ref: "main".to_string(),
        environment: "prod".to_string(),
        auto_inactive: true,
        output_mode: OutputMode::None,
    }
}

/// A status request received by the mock deployments API
#[derive(Debug, Clone)]
pub struct ReceivedStatus {
    pub repository: String,
    pub deployment_id: u64,
    pub authorization: Option<String>,
    pub accept: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct MockApiState {
    received: Arc<Mutex<Vec<ReceivedStatus>>>,
    reply: StatusCode,
}

/// In-process stand-in for the deployments API
pub struct MockApi {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<ReceivedStatus>>>,
}

impl MockApi {
    /// Start a mock answering every status request with `reply`
    pub async fn start(reply: StatusCode) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = MockApiState {
            received: received.clone(),
            reply,
        };
        let app = Router::new()
            .route(
                "/repos/{owner}/{repo}/deployments/{id}/statuses",
                post(create_status),
            )
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, received }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn received(&self) -> Vec<ReceivedStatus> {
        self.received.lock().unwrap().clone()
    }

    /// Wait until at least `count` requests arrived
    pub async fn wait_for(&self, count: usize) -> Vec<ReceivedStatus> {
        for _ in 0..200 {
            let received = self.received();
            if received.len() >= count {
                return received;
            }
            tokio::time::sleep(std::time::Duration::from_millis(25)).await;
        }
        panic!("expected {} status requests, got {:?}", count, self.received());
    }
}

async fn create_status(
    State(state): State<MockApiState>,
    Path((owner, repo, id)): Path<(String, String, u64)>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.received.lock().unwrap().push(ReceivedStatus {
        repository: format!("{}/{}", owner, repo),
        deployment_id: id,
        authorization: header("authorization"),
        accept: header("accept"),
        body,
    });
    state.reply
}
