//! Finite State Machine for a deployment worker
//!
//! A worker only moves forward:
//! `Created -> LogReady -> AnnouncedInProgress -> ScriptRan -> OutputResolved
//! -> (RegistryPromoted)? -> Finalized`. A log file that cannot be created
//! short-circuits `Created` straight to `Finalized` with an `error` outcome.

use openapi_client::models::DeploymentState;
use serde::{Deserialize, Serialize};

/// Worker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Context received, nothing done yet
    Created,

    /// Log file created
    LogReady,

    /// `in_progress` announced
    AnnouncedInProgress,

    /// Deployment command exited
    ScriptRan,

    /// Environment URL resolved (or not) from the output file
    OutputResolved,

    /// Registry updated
    RegistryPromoted,

    /// Final status announced
    Finalized,
}

/// Worker event
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// Log file written
    LogCreated,

    /// Log file could not be created
    LogFailed(String),

    /// `in_progress` status sent
    Announced,

    /// Command exited; `None` when it could not run or died from a signal
    ScriptExited(Option<i32>),

    /// Output handling done
    OutputResolved,

    /// Registry promotion attempted
    Promoted,

    /// Final status sent
    Finalize,
}

/// Worker FSM
#[derive(Debug, Clone)]
pub struct WorkerFsm {
    state: WorkerState,
    outcome: Option<DeploymentState>,
    exit_code: Option<i32>,
    error: Option<String>,
}

impl WorkerFsm {
    /// Create a new FSM in created state
    pub fn new() -> Self {
        Self {
            state: WorkerState::Created,
            outcome: None,
            exit_code: None,
            error: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Terminal status to announce, known once the script ran or the log failed
    pub fn outcome(&self) -> Option<DeploymentState> {
        self.outcome
    }

    /// Exit code of the deployment command
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Get error message if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_finalized(&self) -> bool {
        self.state == WorkerState::Finalized
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: WorkerEvent) -> Result<(), String> {
        let new_state = match (&self.state, &event) {
            (WorkerState::Created, WorkerEvent::LogCreated) => WorkerState::LogReady,
            (WorkerState::Created, WorkerEvent::LogFailed(err)) => {
                self.error = Some(err.clone());
                self.outcome = Some(DeploymentState::Error);
                WorkerState::Finalized
            }

            (WorkerState::LogReady, WorkerEvent::Announced) => WorkerState::AnnouncedInProgress,

            (WorkerState::AnnouncedInProgress, WorkerEvent::ScriptExited(code)) => {
                self.exit_code = *code;
                self.outcome = Some(match code {
                    Some(0) => DeploymentState::Success,
                    _ => DeploymentState::Failure,
                });
                WorkerState::ScriptRan
            }

            (WorkerState::ScriptRan, WorkerEvent::OutputResolved) => WorkerState::OutputResolved,

            (WorkerState::OutputResolved, WorkerEvent::Promoted) => WorkerState::RegistryPromoted,

            (WorkerState::OutputResolved, WorkerEvent::Finalize)
            | (WorkerState::RegistryPromoted, WorkerEvent::Finalize) => WorkerState::Finalized,

            // Invalid transitions
            (state, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", state, event));
            }
        };

        self.state = new_state;
        Ok(())
    }
}

impl Default for WorkerFsm {
    fn default() -> Self {
        Self::new()
    }
}
