//! Bounded log-marker polling for started children.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::PROCESS_TARGET;
use crate::errors::ProcessError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Polls an append-only log artefact for a kind-specific "ready" marker.
///
/// Absence of the marker, or of the log itself, means "not ready" — never an
/// error. Only [`ReadinessProbe::wait`] can fail, and only by timing out.
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    log_path: PathBuf,
    marker: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl ReadinessProbe {
    /// Builds a probe for the given log artefact and marker line fragment.
    #[must_use]
    pub fn new(log_path: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Self {
            log_path: log_path.into(),
            marker: marker.into(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the polling deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the polling cadence.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Log artefact being polled.
    #[must_use]
    pub fn log_path(&self) -> &Path {
        self.log_path.as_path()
    }

    /// Returns whether the marker has appeared in the log.
    #[must_use]
    pub fn check(&self) -> bool {
        let Ok(content) = fs::read_to_string(&self.log_path) else {
            return false;
        };
        content.lines().any(|line| line.contains(&self.marker))
    }

    /// Polls until the marker appears or the deadline expires.
    ///
    /// # Errors
    /// Returns [`ProcessError::ReadinessTimeout`] when the deadline expires;
    /// callers decide whether that warrants a retry or an abort.
    pub fn wait(&self) -> Result<(), ProcessError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if self.check() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ProcessError::ReadinessTimeout {
                    marker: self.marker.clone(),
                    log: self.log_path.clone(),
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
            trace!(
                target: PROCESS_TARGET,
                log = %self.log_path.display(),
                marker = self.marker.as_str(),
                "marker not present yet"
            );
            thread::sleep(self.poll_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests use expect for clarity")]

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_log_means_not_ready() {
        let dir = TempDir::new().expect("temp dir");
        let probe = ReadinessProbe::new(dir.path().join("absent.log"), "ready");
        assert!(!probe.check());
    }

    #[test]
    fn marker_in_any_line_means_ready() {
        let dir = TempDir::new().expect("temp dir");
        let log = dir.path().join("switch.log");
        fs::write(&log, "starting up\nflow table initialised: actions=drop\n")
            .expect("write log");
        let probe = ReadinessProbe::new(&log, "actions=drop");
        assert!(probe.check());
        probe.wait().expect("wait should succeed immediately");
    }

    #[test]
    fn wait_times_out_with_a_distinct_error() {
        let dir = TempDir::new().expect("temp dir");
        let log = dir.path().join("switch.log");
        fs::write(&log, "still starting\n").expect("write log");
        let probe = ReadinessProbe::new(&log, "actions=drop")
            .with_timeout(Duration::from_millis(50))
            .with_poll_interval(Duration::from_millis(10));
        let error = probe.wait().expect_err("wait should time out");
        assert!(matches!(error, ProcessError::ReadinessTimeout { .. }));
    }
}
