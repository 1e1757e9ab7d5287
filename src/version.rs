//! Version probing for the installed core binary.

use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// How long a probe may take before it is abandoned.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Ask the binary at `path` for its version.
///
/// Runs the binary once with `--version` and returns its trimmed stdout.
/// A missing or unexecutable binary, a non-zero exit, or a hung probe all
/// yield `None` - callers treat that the same as "not installed". Never
/// retries and never blocks past [`PROBE_TIMEOUT`].
pub async fn probe(path: &Path) -> Option<String> {
    probe_with_timeout(path, PROBE_TIMEOUT).await
}

async fn probe_with_timeout(path: &Path, timeout: Duration) -> Option<String> {
    if !path.exists() {
        return None;
    }

    // kill_on_drop: an unresponsive binary is killed when the timed-out
    // future is dropped, not left running.
    let result = tokio::time::timeout(
        timeout,
        Command::new(path)
            .arg("--version")
            .kill_on_drop(true)
            .output(),
    );

    let output = match result.await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::debug!("version probe of {:?} failed to run: {e}", path);
            return None;
        }
        Err(_) => {
            tracing::warn!("version probe of {:?} timed out", path);
            return None;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!("version probe stderr: {}", stderr.trim());
        }
        return None;
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}
