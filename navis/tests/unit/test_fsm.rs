//! FSM unit tests

use navis::deploy::fsm::{WorkerEvent, WorkerFsm, WorkerState};
use openapi_client::models::DeploymentState;

#[test]
fn test_fsm_initial_state() {
    let fsm = WorkerFsm::new();
    assert_eq!(fsm.state(), WorkerState::Created);
    assert!(fsm.outcome().is_none());
    assert!(fsm.error().is_none());
}

#[test]
fn test_fsm_failure_flow_without_promotion() {
    let mut fsm = WorkerFsm::new();

    fsm.process(WorkerEvent::LogCreated).unwrap();
    fsm.process(WorkerEvent::Announced).unwrap();
    fsm.process(WorkerEvent::ScriptExited(Some(2))).unwrap();
    assert_eq!(fsm.outcome(), Some(DeploymentState::Failure));
    assert_eq!(fsm.exit_code(), Some(2));

    // OutputResolved -> Finalized skips the registry
    fsm.process(WorkerEvent::OutputResolved).unwrap();
    fsm.process(WorkerEvent::Finalize).unwrap();
    assert_eq!(fsm.state(), WorkerState::Finalized);
}

#[test]
fn test_fsm_script_that_did_not_run_fails() {
    let mut fsm = WorkerFsm::new();

    fsm.process(WorkerEvent::LogCreated).unwrap();
    fsm.process(WorkerEvent::Announced).unwrap();
    fsm.process(WorkerEvent::ScriptExited(None)).unwrap();

    assert_eq!(fsm.outcome(), Some(DeploymentState::Failure));
    assert_eq!(fsm.exit_code(), None);
}

#[test]
fn test_fsm_never_moves_backwards() {
    let mut fsm = WorkerFsm::new();

    fsm.process(WorkerEvent::LogCreated).unwrap();
    assert!(fsm.process(WorkerEvent::LogCreated).is_err());
    assert!(fsm.process(WorkerEvent::LogFailed("late".to_string())).is_err());
    assert_eq!(fsm.state(), WorkerState::LogReady);
}

#[test]
fn test_fsm_invalid_transition() {
    let mut fsm = WorkerFsm::new();

    // Cannot run the script before announcing
    let result = fsm.process(WorkerEvent::ScriptExited(Some(0)));
    assert!(result.is_err());
    assert_eq!(fsm.state(), WorkerState::Created);
}

#[test]
fn test_fsm_finalized_is_terminal() {
    let mut fsm = WorkerFsm::new();

    fsm.process(WorkerEvent::LogFailed("disk full".to_string()))
        .unwrap();
    assert!(fsm.process(WorkerEvent::Announced).is_err());
    assert!(fsm.process(WorkerEvent::Finalize).is_err());
    assert_eq!(fsm.outcome(), Some(DeploymentState::Error));
}
