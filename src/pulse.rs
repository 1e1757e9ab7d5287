//! Heartbeat dispatch to the core binary.
//!
//! A heartbeat ("pulse") is one discrete activity record: file, project and
//! the time window it covers. The core binary owns the actual submission,
//! including offline queueing and retries; this module only invokes it and
//! reads the verdict off its exit code.

use chrono::{DateTime, SecondsFormat, Utc};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

/// Tag identifying the embedding editor to the service.
pub const EDITOR_TYPE: &str = "vscode";

/// How long one core invocation may take before it is abandoned.
const DISPATCH_TIMEOUT: Duration = Duration::from_secs(60);

// Exit codes are a wire contract with the core binary; never renumber.
const EXIT_OFFLINE_QUEUED: i32 = 102;
const EXIT_CONFIG_ERROR: i32 = 103;
const EXIT_INVALID_CREDENTIAL: i32 = 104;

/// One activity record handed to the core for submission.
///
/// Built by the agent when the activity filter accepts an event; consumed
/// exactly once. Never persisted: if dispatch fails the event is dropped,
/// because the core owns durability for offline cases.
#[derive(Debug, Clone)]
pub struct HeartbeatEvent {
    pub file_name: String,
    pub project_name: String,
    pub editor_token: String,
    pub editor_type: &'static str,
    pub is_write: bool,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
}

/// What the core said about one heartbeat, classified from its exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Heartbeat accepted.
    Success,
    /// Network unavailable; the core buffered the record for a later sync.
    OfflineQueued,
    /// The core could not parse its local configuration file.
    ConfigError,
    /// The editor credential was rejected.
    InvalidCredential,
    /// Unclassified failure carrying the raw exit code.
    Unknown(i32),
}

impl DispatchOutcome {
    /// Classify a core exit code.
    pub fn from_exit_code(code: i32) -> Self {
        match code {
            0 => DispatchOutcome::Success,
            EXIT_OFFLINE_QUEUED => DispatchOutcome::OfflineQueued,
            EXIT_CONFIG_ERROR => DispatchOutcome::ConfigError,
            EXIT_INVALID_CREDENTIAL => DispatchOutcome::InvalidCredential,
            other => DispatchOutcome::Unknown(other),
        }
    }
}

impl std::fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchOutcome::Success => write!(f, "heartbeat sent"),
            DispatchOutcome::OfflineQueued => write!(f, "working offline, queued for sync"),
            DispatchOutcome::ConfigError => write!(f, "core config parsing error"),
            DispatchOutcome::InvalidCredential => write!(f, "invalid editor key"),
            DispatchOutcome::Unknown(code) => write!(f, "unknown core error ({code})"),
        }
    }
}

/// Dispatch errors: failures of this agent, not verdicts from the core.
#[derive(Debug)]
pub enum DispatchError {
    /// The core process could not be spawned or awaited
    Spawn(String),
    /// The core did not exit within the dispatch timeout
    Timeout,
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::Spawn(e) => write!(f, "failed to run core: {e}"),
            DispatchError::Timeout => write!(f, "core did not exit in time"),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Invokes the core binary once per heartbeat.
pub struct Dispatcher {
    core_path: PathBuf,
    /// Full endpoint URL heartbeats are submitted to.
    api_url: String,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(core_path: PathBuf, api_url: String) -> Self {
        Self {
            core_path,
            api_url,
            timeout: DISPATCH_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send one heartbeat through the core and classify the result.
    ///
    /// The argument list is passed as a discrete array, never through a
    /// shell, so file and project names with special characters cannot
    /// inject anything. No retry on any outcome; exit code 102 means the
    /// core already queued the record itself.
    pub async fn dispatch(&self, event: &HeartbeatEvent) -> Result<DispatchOutcome, DispatchError> {
        let args = self.argv(event);
        tracing::debug!("sending pulse: {}", args.join(" "));

        // kill_on_drop: a core that outlives the timeout is killed, not
        // detached, when the abandoned future is dropped.
        let result = tokio::time::timeout(
            self.timeout,
            Command::new(&self.core_path)
                .args(&args)
                .kill_on_drop(true)
                .output(),
        );

        let output = match result.await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(DispatchError::Spawn(e.to_string())),
            Err(_) => return Err(DispatchError::Timeout),
        };

        // Killed by a signal leaves no exit code; classify as unknown.
        let code = output.status.code().unwrap_or(-1);
        let outcome = DispatchOutcome::from_exit_code(code);

        if code != 0 {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                tracing::warn!("core stderr: {}", stderr.trim());
            }
            let stdout = String::from_utf8_lossy(&output.stdout);
            if !stdout.trim().is_empty() {
                tracing::warn!("core stdout: {}", stdout.trim());
            }
        }

        Ok(outcome)
    }

    /// Ordered argument list for one heartbeat.
    fn argv(&self, event: &HeartbeatEvent) -> Vec<String> {
        vec![
            "--api-url".to_string(),
            self.api_url.clone(),
            "--editor-token".to_string(),
            event.editor_token.clone(),
            "--editor-type".to_string(),
            event.editor_type.to_string(),
            "--project-name".to_string(),
            event.project_name.clone(),
            "--file-name".to_string(),
            event.file_name.clone(),
            "--started-at".to_string(),
            event.started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            "--stopped-at".to_string(),
            event.stopped_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        ]
    }
}
