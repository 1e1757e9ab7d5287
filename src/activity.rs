//! Editor activity events and the heartbeat debounce filter.
//!
//! Editors fire activity callbacks far faster than heartbeats should flow:
//! every cursor movement and selection change arrives here. The filter keeps
//! a single rolling watermark (last file, last emission time) and lets an
//! event through only when it is a save, the active file changed, or the
//! debounce window has elapsed.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Minimum interval between heartbeats for unchanged, non-save activity.
pub const DEBOUNCE_MS: i64 = 120_000;

/// A raw activity signal from the embedding editor.
///
/// The editor glue produces these from its own callbacks (selection change,
/// active-editor switch, document save) and feeds them to the agent as
/// camelCase JSON lines.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    /// Absolute path of the file the activity happened in.
    pub file_path: String,
    /// True for a document save, false for selection/focus activity.
    #[serde(default)]
    pub is_write: bool,
    /// Name of the project/workspace the file belongs to.
    #[serde(default)]
    pub project_name: Option<String>,
}

/// The time window a heartbeat covers: from the previous emission (or the
/// epoch, for the very first one) up to the event that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseWindow {
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
}

/// Decides which activity events become heartbeats.
///
/// Holds exactly one pending fact about the past: the last accepted file and
/// when it was accepted. It is a watermark, not a queue.
#[derive(Debug)]
pub struct ActivityEventFilter {
    last_file: Option<String>,
    /// Starts at the epoch so the very first event always qualifies.
    last_pulse_at: DateTime<Utc>,
}

impl Default for ActivityEventFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityEventFilter {
    pub fn new() -> Self {
        Self {
            last_file: None,
            last_pulse_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Decide whether an event should produce a heartbeat.
    ///
    /// Emits when the event is a save, when the debounce window has elapsed,
    /// or when the active file changed; otherwise suppresses. On emission the
    /// watermark advances and the covered time window is returned.
    pub fn accept(
        &mut self,
        file_path: &str,
        is_write: bool,
        now: DateTime<Utc>,
    ) -> Option<PulseWindow> {
        let elapsed = (now - self.last_pulse_at).num_milliseconds() >= DEBOUNCE_MS;
        let file_changed = self.last_file.as_deref() != Some(file_path);

        if !(is_write || elapsed || file_changed) {
            return None;
        }

        let window = PulseWindow {
            started_at: self.last_pulse_at,
            stopped_at: now,
        };
        self.last_file = Some(file_path.to_string());
        self.last_pulse_at = now;
        Some(window)
    }
}
