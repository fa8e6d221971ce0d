//! Derives the per-session directories holding runtime artefacts.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while preparing the session runtime directories.
#[derive(Debug, Error)]
pub enum RuntimePathsError {
    /// A runtime directory could not be created.
    #[error("failed to prepare runtime directory '{path}': {source}")]
    Create {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Per-session filesystem layout for pid records, logs, and sockets.
///
/// Pid records are durable so a *separate* orchestration invocation (for
/// example an explicit teardown run after the starting process exited) can
/// still locate and signal the right children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    base: PathBuf,
}

impl RuntimePaths {
    /// Uses an explicit base directory for the session.
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Derives the default session directory under the system temp dir.
    #[must_use]
    pub fn session_default() -> Self {
        let mut base = env::temp_dir();
        base.push("switchyard");
        Self { base }
    }

    /// Creates the pid, log, and socket directories.
    ///
    /// # Errors
    /// Returns [`RuntimePathsError::Create`] when a directory cannot be made.
    pub fn prepare(&self) -> Result<(), RuntimePathsError> {
        for dir in [self.pid_dir(), self.log_dir(), self.sock_dir()] {
            fs::create_dir_all(&dir)
                .map_err(|source| RuntimePathsError::Create { path: dir, source })?;
        }
        Ok(())
    }

    /// Base directory of the session.
    #[must_use]
    pub fn base(&self) -> &Path {
        self.base.as_path()
    }

    /// Directory holding pid record files.
    #[must_use]
    pub fn pid_dir(&self) -> PathBuf {
        self.base.join("pid")
    }

    /// Directory holding per-entity log artefacts.
    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        self.base.join("log")
    }

    /// Directory holding control sockets.
    #[must_use]
    pub fn sock_dir(&self) -> PathBuf {
        self.base.join("sock")
    }

    /// Pid record path for the named entity, e.g. `pid/openflowd.switch1.pid`.
    #[must_use]
    pub fn pid_path(&self, prefix: &str, name: &str) -> PathBuf {
        self.pid_dir().join(format!("{prefix}.{name}.pid"))
    }

    /// Log artefact path for the named entity, e.g. `log/openflowd.switch1.log`.
    #[must_use]
    pub fn log_path(&self, prefix: &str, name: &str) -> PathBuf {
        self.log_dir().join(format!("{prefix}.{name}.log"))
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests use expect for clarity")]

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn prepare_creates_the_session_layout() {
        let dir = TempDir::new().expect("temp dir");
        let paths = RuntimePaths::new(dir.path().join("session"));
        paths.prepare().expect("prepare should succeed");
        assert!(paths.pid_dir().is_dir());
        assert!(paths.log_dir().is_dir());
        assert!(paths.sock_dir().is_dir());
    }

    #[test]
    fn prepare_is_idempotent() {
        let dir = TempDir::new().expect("temp dir");
        let paths = RuntimePaths::new(dir.path());
        paths.prepare().expect("first prepare");
        paths.prepare().expect("second prepare");
    }

    #[test]
    fn artefact_paths_are_keyed_by_prefix_and_name() {
        let paths = RuntimePaths::new("/tmp/switchyard-test");
        assert_eq!(
            paths.pid_path("vhost", "host1"),
            PathBuf::from("/tmp/switchyard-test/pid/vhost.host1.pid")
        );
        assert_eq!(
            paths.log_path("openflowd", "switch1"),
            PathBuf::from("/tmp/switchyard-test/log/openflowd.switch1.log")
        );
    }
}
