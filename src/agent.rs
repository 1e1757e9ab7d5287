//! Agent lifecycle: install the core, then turn activity into heartbeats.
//!
//! Ordering is strict and single-threaded: [`Agent::bootstrap`] is awaited
//! to completion before any activity event is handled, and each dispatch is
//! awaited before the next event is accepted. Install failures degrade to
//! "no core installed" rather than stopping the agent; in that state events
//! are dropped without touching the debounce watermark.

use crate::activity::{ActivityEvent, ActivityEventFilter};
use crate::config::{self, Settings};
use crate::installer::{InstallError, InstallStatus, Installer, LocalBinaryRecord};
use crate::platform::PlatformTarget;
use crate::pulse::{DispatchOutcome, Dispatcher, HeartbeatEvent, EDITOR_TYPE};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Project name used when the editor did not supply one.
const DEFAULT_PROJECT_NAME: &str = "unknown-project";

/// The background agent: dependency lifecycle plus heartbeat pipeline.
pub struct Agent {
    settings: Settings,
    platform: PlatformTarget,
    installer: Installer,
    dispatcher: Dispatcher,
    filter: ActivityEventFilter,
}

impl Agent {
    /// Create an agent rooted at the default agent home.
    pub fn new(settings: Settings) -> Self {
        Self::with_home(settings, config::home_dir())
    }

    /// Create an agent rooted at an explicit home directory.
    pub fn with_home(settings: Settings, home_dir: PathBuf) -> Self {
        // Resolved once; immutable for the life of the process.
        let platform = PlatformTarget::resolve();
        let installer = Installer::new(&settings, platform, home_dir.clone());
        let dispatcher = Dispatcher::new(
            platform.core_path(&home_dir),
            format!("{}/units", settings.api_base_url),
        );

        Self {
            settings,
            platform,
            installer,
            dispatcher,
            filter: ActivityEventFilter::new(),
        }
    }

    /// Install or update the core before any heartbeat can flow.
    ///
    /// Never fails the agent: install errors are logged and the agent runs
    /// on with no core, dropping events until a later install succeeds.
    pub async fn bootstrap(&self) -> bool {
        match self.installer.ensure_installed().await {
            Ok(status) => {
                tracing::debug!("core install check finished: {status:?}");
                true
            }
            Err(e) => {
                tracing::error!("could not install hackerlog core: {e}");
                self.installer.is_core_installed()
            }
        }
    }

    /// Re-run the install check on demand.
    pub async fn reinstall(&self) -> Result<InstallStatus, InstallError> {
        self.installer.ensure_installed().await
    }

    /// Handle one raw activity event, dispatching a heartbeat if it
    /// qualifies. Returns the core's verdict when one was sent.
    pub async fn handle_activity(
        &mut self,
        event: &ActivityEvent,
        now: DateTime<Utc>,
    ) -> Option<DispatchOutcome> {
        let Some(editor_token) = self.settings.editor_key.clone() else {
            tracing::debug!("no editor key configured, dropping activity event");
            return None;
        };

        // Check-on-use: the core may have been upgraded or deleted by an
        // external process since the last event. When it is absent, events
        // are dropped before the filter so the watermark stays put.
        if !self.installer.is_core_installed() {
            tracing::debug!("core not installed, dropping activity event");
            return None;
        }

        let window = self.filter.accept(&event.file_path, event.is_write, now)?;

        let heartbeat = HeartbeatEvent {
            file_name: file_name_of(&event.file_path),
            project_name: event
                .project_name
                .clone()
                .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string()),
            editor_token,
            editor_type: EDITOR_TYPE,
            is_write: event.is_write,
            started_at: window.started_at,
            stopped_at: window.stopped_at,
        };

        match self.dispatcher.dispatch(&heartbeat).await {
            Ok(outcome) => {
                log_outcome(outcome);
                Some(outcome)
            }
            Err(e) => {
                tracing::error!("heartbeat dispatch failed: {e}");
                None
            }
        }
    }

    /// Current view of the installed core, recomputed from disk.
    pub async fn local_record(&self) -> LocalBinaryRecord {
        self.installer.local_record().await
    }

    pub fn platform(&self) -> PlatformTarget {
        self.platform
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Final path component of an activity event's file path.
fn file_name_of(file_path: &str) -> String {
    Path::new(file_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.to_string())
}

/// Surface a dispatch verdict at the severity it deserves. The status text
/// itself is consumed by the embedding editor's status reporter.
fn log_outcome(outcome: DispatchOutcome) {
    match outcome {
        DispatchOutcome::Success => tracing::debug!("{outcome}"),
        DispatchOutcome::OfflineQueued => tracing::warn!("{outcome}"),
        DispatchOutcome::ConfigError | DispatchOutcome::InvalidCredential => {
            tracing::error!("{outcome}")
        }
        DispatchOutcome::Unknown(_) => tracing::error!("{outcome}"),
    }
}
