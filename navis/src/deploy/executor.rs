//! Deployment worker

use std::sync::Arc;

use openapi_client::models::DeploymentState;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::app::state::WorkerTracker;
use crate::deploy::artifacts::Artifacts;
use crate::deploy::context::DeploymentContext;
use crate::deploy::fsm::{WorkerEvent, WorkerFsm};
use crate::deploy::ident::InternalDeploymentId;
use crate::deploy::output::resolve_environment_url;
use crate::deploy::registry::ActiveDeploymentRegistry;
use crate::deploy::reporter::{announce, StatusReporter};
use crate::deploy::script::{run_script, ScriptEnv};
use crate::deploy::status::DeploymentStatus;
use crate::errors::NavisError;
use crate::filesys::file::File;
use crate::utils::ctime_now;

/// Runs one deployment from log creation to its final status
pub struct DeploymentWorker {
    context: DeploymentContext,
    reporter: Arc<dyn StatusReporter>,
    registry: Arc<ActiveDeploymentRegistry>,
    artifacts: Arc<Artifacts>,
    fsm: WorkerFsm,
}

impl DeploymentWorker {
    /// Create a new deployment worker
    pub fn new(
        context: DeploymentContext,
        reporter: Arc<dyn StatusReporter>,
        registry: Arc<ActiveDeploymentRegistry>,
        artifacts: Arc<Artifacts>,
    ) -> Self {
        Self {
            context,
            reporter,
            registry,
            artifacts,
            fsm: WorkerFsm::new(),
        }
    }

    /// Run the deployment and return the final announced state
    pub async fn run(mut self) -> DeploymentState {
        let internal_id = self.context.internal_id();
        let log_file = self.artifacts.log_file(&internal_id);

        if let Err(e) = log_file.create_with(&format!("-- {}\n", ctime_now())).await {
            error!("Cannot open a new log file {}: {}", log_file.path().display(), e);
            self.transition(WorkerEvent::LogFailed(e.to_string()));
            self.announce(&DeploymentStatus::new(DeploymentState::Error))
                .await;
            return DeploymentState::Error;
        }
        info!("Log file created");
        self.transition(WorkerEvent::LogCreated);

        let log_url = self.artifacts.log_url(&internal_id);
        self.announce(&DeploymentStatus::new(DeploymentState::InProgress).with_log_url(&log_url))
            .await;
        self.transition(WorkerEvent::Announced);

        let exit_code = self.execute(&internal_id, &log_file).await;
        self.transition(WorkerEvent::ScriptExited(exit_code));

        let env_url =
            resolve_environment_url(self.context.output_mode, &internal_id, &self.artifacts).await;
        self.transition(WorkerEvent::OutputResolved);

        if self.context.auto_inactive {
            self.promote(env_url.as_deref()).await;
            self.transition(WorkerEvent::Promoted);
        }

        let outcome = self.fsm.outcome().unwrap_or(DeploymentState::Failure);
        let status = DeploymentStatus::new(outcome)
            .with_log_url(log_url)
            .with_environment_url(env_url);
        self.announce(&status).await;
        self.transition(WorkerEvent::Finalize);

        outcome
    }

    async fn execute(&self, internal_id: &InternalDeploymentId, log_file: &File) -> Option<i32> {
        let env = match self.script_env(internal_id, log_file) {
            Ok(env) => env,
            Err(e) => {
                error!("Cannot prepare deployment environment: {}", e);
                return None;
            }
        };

        match run_script(&self.context.command, &env).await {
            Ok(status) => status.code(),
            Err(e) => {
                error!("Cannot run deployment command: {}", e);
                None
            }
        }
    }

    fn script_env(
        &self,
        internal_id: &InternalDeploymentId,
        log_file: &File,
    ) -> Result<ScriptEnv, NavisError> {
        Ok(ScriptEnv {
            log_file: Artifacts::absolute(log_file)?,
            git_ref: self.context.git_ref.clone(),
            repository: self.context.repository.clone(),
            output_file: Artifacts::absolute(&self.artifacts.output_file(internal_id))?,
        })
    }

    async fn promote(&self, env_url: Option<&str>) {
        match self
            .registry
            .promote(&self.context, env_url, self.reporter.as_ref(), &self.artifacts)
            .await
        {
            Ok(Some(previous)) => info!("Deployment {} is now inactive", previous),
            Ok(None) => debug!("No previous active deployment to supersede"),
            Err(e) => error!("Registry promotion skipped: {}", e),
        }
    }

    async fn announce(&self, status: &DeploymentStatus) {
        announce(
            self.reporter.as_ref(),
            self.context.deployment_id,
            &self.context.repository,
            status,
        )
        .await;
    }

    fn transition(&mut self, event: WorkerEvent) {
        if let Err(e) = self.fsm.process(event) {
            warn!("{}", e);
            return;
        }
        debug!("Worker state: {:?}", self.fsm.state());
    }
}

/// Spawn a detached worker task.
///
/// There is no cap on concurrent workers: every scheduled deployment starts
/// immediately and runs until its command exits.
pub fn spawn(worker: DeploymentWorker, tracker: Arc<WorkerTracker>) -> JoinHandle<DeploymentState> {
    let span = info_span!(
        "deployment",
        id = worker.context.deployment_id,
        repo = %worker.context.repository,
        env = %worker.context.environment,
    );

    tokio::spawn(
        async move {
            let _active = tracker.enter();
            let outcome = worker.run().await;
            info!("Deployment finished: {}", outcome);
            outcome
        }
        .instrument(span),
    )
}
