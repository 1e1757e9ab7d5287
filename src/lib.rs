//! Hackerlog Agent - keeps the hackerlog core installed and turns editor
//! activity into rate-limited heartbeats.
//!
//! The agent has two jobs, and they run in strict order:
//!
//! 1. **Dependency lifecycle**: resolve the host platform, ask the API for
//!    the latest core build, and download/extract/install it when the local
//!    copy is missing or outdated.
//! 2. **Heartbeat pipeline**: debounce raw editor activity (selection
//!    changes, saves, editor switches) down to at most one heartbeat per
//!    file per two minutes (saves and file switches always pass), invoke the
//!    installed core once per heartbeat, and classify its exit code.
//!
//! ```text
//! editor events ──▶ ActivityEventFilter ──▶ Dispatcher ──▶ core (subprocess)
//!                                                              │
//!        Installer ──▶ ~/.hackerlog/core ◀────────────────────┘ exit code
//! ```
//!
//! The core binary is opaque here: it owns submission, offline queueing and
//! retries, and reports back only through its exit code.
//!
//! # Example
//!
//! ```no_run
//! use hackerlog_agent::{ActivityEvent, Agent, Settings};
//!
//! # async fn run() {
//! let settings = Settings::load().unwrap_or_default();
//! let mut agent = Agent::new(settings);
//!
//! // Install or update the core before any heartbeat can flow.
//! agent.bootstrap().await;
//!
//! let event = ActivityEvent {
//!     file_path: "/home/me/project/src/main.rs".to_string(),
//!     is_write: true,
//!     project_name: Some("project".to_string()),
//! };
//! agent.handle_activity(&event, chrono::Utc::now()).await;
//! # }
//! ```

pub mod activity;
pub mod agent;
pub mod config;
pub mod installer;
pub mod platform;
pub mod pulse;
pub mod version;

// Re-export key types at crate root for convenience
pub use activity::{ActivityEvent, ActivityEventFilter, PulseWindow, DEBOUNCE_MS};
pub use agent::Agent;
pub use config::{validate_editor_key, validate_proxy, ConfigError, Settings};
pub use installer::{InstallError, InstallStatus, Installer, LocalBinaryRecord, RemoteVersionInfo};
pub use platform::{Arch, Os, PlatformTarget};
pub use pulse::{DispatchError, DispatchOutcome, Dispatcher, HeartbeatEvent, EDITOR_TYPE};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
