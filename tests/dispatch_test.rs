//! End-to-end dispatch tests against a stub core executable.
//!
//! Unix-only: the stub core is a shell script. Classification logic itself
//! is covered by unit tests on all platforms.

#![cfg(unix)]

use chrono::Utc;
use hackerlog_agent::{ActivityEvent, Agent, DispatchOutcome, Dispatcher, HeartbeatEvent, Settings, EDITOR_TYPE};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

fn write_stub_core(path: &Path, script: &str) {
    std::fs::write(path, script).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn heartbeat() -> HeartbeatEvent {
    let now = Utc::now();
    HeartbeatEvent {
        file_name: "main.rs".to_string(),
        project_name: "proj".to_string(),
        editor_token: "A1B2C3D4-E5F6-7890-ABCD-1234567890AB".to_string(),
        editor_type: EDITOR_TYPE,
        is_write: false,
        started_at: now,
        stopped_at: now,
    }
}

async fn dispatch_with_exit_code(code: i32) -> DispatchOutcome {
    let dir = tempfile::tempdir().unwrap();
    let core = dir.path().join("core");
    write_stub_core(&core, &format!("#!/bin/sh\nexit {code}\n"));

    let dispatcher = Dispatcher::new(core, "http://127.0.0.1:1/v1/units".to_string());
    dispatcher.dispatch(&heartbeat()).await.unwrap()
}

#[tokio::test]
async fn test_exit_codes_map_to_outcomes() {
    assert_eq!(dispatch_with_exit_code(0).await, DispatchOutcome::Success);
    assert_eq!(
        dispatch_with_exit_code(102).await,
        DispatchOutcome::OfflineQueued
    );
    assert_eq!(
        dispatch_with_exit_code(103).await,
        DispatchOutcome::ConfigError
    );
    assert_eq!(
        dispatch_with_exit_code(104).await,
        DispatchOutcome::InvalidCredential
    );
    assert_eq!(
        dispatch_with_exit_code(7).await,
        DispatchOutcome::Unknown(7)
    );
}

#[tokio::test]
async fn test_stderr_does_not_change_classification() {
    let dir = tempfile::tempdir().unwrap();
    let core = dir.path().join("core");
    write_stub_core(&core, "#!/bin/sh\necho 'api unreachable' >&2\nexit 102\n");

    let dispatcher = Dispatcher::new(core, "http://127.0.0.1:1/v1/units".to_string());
    let outcome = dispatcher.dispatch(&heartbeat()).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::OfflineQueued);
}

#[tokio::test]
async fn test_offline_outcome_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let core = dir.path().join("core");
    let counter = dir.path().join("invocations");

    // Count every invocation, then report "offline, queued".
    write_stub_core(
        &core,
        &format!("#!/bin/sh\necho run >> {}\nexit 102\n", counter.display()),
    );

    let dispatcher = Dispatcher::new(core, "http://127.0.0.1:1/v1/units".to_string());
    let outcome = dispatcher.dispatch(&heartbeat()).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::OfflineQueued);

    let runs = std::fs::read_to_string(&counter).unwrap();
    assert_eq!(runs.lines().count(), 1, "dispatch must invoke the core exactly once");
}

#[tokio::test]
async fn test_missing_core_is_a_spawn_error() {
    let dispatcher = Dispatcher::new(
        PathBuf::from("/nonexistent/hackerlog-core"),
        "http://127.0.0.1:1/v1/units".to_string(),
    );
    assert!(dispatcher.dispatch(&heartbeat()).await.is_err());
}

#[tokio::test]
async fn test_agent_pipeline_with_stub_core() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        editor_key: Some("A1B2C3D4-E5F6-7890-ABCD-1234567890AB".to_string()),
        ..Settings::default()
    };
    let mut agent = Agent::with_home(settings, dir.path().to_path_buf());

    // Place a stub core where the installer would have put it.
    let core = agent.platform().core_path(dir.path());
    write_stub_core(&core, "#!/bin/sh\nexit 0\n");

    let save = ActivityEvent {
        file_path: "/work/proj/src/lib.rs".to_string(),
        is_write: true,
        project_name: Some("proj".to_string()),
    };

    // Saves always dispatch, back to back.
    let first = agent.handle_activity(&save, Utc::now()).await;
    let second = agent.handle_activity(&save, Utc::now()).await;
    assert_eq!(first, Some(DispatchOutcome::Success));
    assert_eq!(second, Some(DispatchOutcome::Success));

    // Plain activity on the same file right after is debounced.
    let activity = ActivityEvent {
        file_path: "/work/proj/src/lib.rs".to_string(),
        is_write: false,
        project_name: Some("proj".to_string()),
    };
    assert!(agent.handle_activity(&activity, Utc::now()).await.is_none());

    // A file switch emits immediately.
    let other = ActivityEvent {
        file_path: "/work/proj/src/other.rs".to_string(),
        is_write: false,
        project_name: Some("proj".to_string()),
    };
    assert_eq!(
        agent.handle_activity(&other, Utc::now()).await,
        Some(DispatchOutcome::Success)
    );
}
