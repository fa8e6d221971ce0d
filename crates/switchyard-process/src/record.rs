//! Durable name→pid records enabling cross-invocation process control.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, info};

use switchyard_config::RuntimePaths;

use crate::PROCESS_TARGET;
use crate::errors::ProcessError;
use crate::files::atomic_write;
use crate::launcher::Launcher;

/// A persisted association between an entity name and a live child pid.
///
/// At most one record exists per entity name at a time. Records survive the
/// orchestrating process so an explicit teardown run later can still locate
/// and signal the child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    name: String,
    pid: u32,
    path: PathBuf,
}

impl ProcessRecord {
    /// Persists the mapping for the named entity and returns the record.
    ///
    /// # Errors
    /// Returns [`ProcessError::RecordWrite`] when the record file cannot be
    /// written.
    pub fn record(
        paths: &RuntimePaths,
        prefix: &str,
        name: &str,
        pid: u32,
    ) -> Result<Self, ProcessError> {
        let path = paths.pid_path(prefix, name);
        atomic_write(&path, format!("{pid}\n").as_bytes()).map_err(|source| {
            ProcessError::RecordWrite {
                path: path.clone(),
                source,
            }
        })?;
        debug!(
            target: PROCESS_TARGET,
            entity = name,
            pid,
            file = %path.display(),
            "pid record written"
        );
        Ok(Self {
            name: name.to_owned(),
            pid,
            path,
        })
    }

    /// Loads the record for the named entity.
    ///
    /// # Errors
    /// Returns [`ProcessError::MissingRecord`] when no record exists,
    /// [`ProcessError::RecordRead`] when it cannot be read, and
    /// [`ProcessError::MalformedRecord`] when it holds anything other than a
    /// positive process id.
    pub fn read(paths: &RuntimePaths, prefix: &str, name: &str) -> Result<Self, ProcessError> {
        let path = paths.pid_path(prefix, name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(ProcessError::MissingRecord {
                    name: name.to_owned(),
                    path,
                });
            }
            Err(source) => return Err(ProcessError::RecordRead { path, source }),
        };
        let pid = content
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|pid| *pid != 0)
            .ok_or(ProcessError::MalformedRecord { path: path.clone() })?;
        Ok(Self {
            name: name.to_owned(),
            pid,
            path,
        })
    }

    /// Entity name the record belongs to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recorded process id.
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Terminates the recorded pid through the launcher and removes the
    /// record.
    ///
    /// Shutdown is best-effort: a pid that already exited is treated as
    /// success, and the record file is removed either way.
    ///
    /// # Errors
    /// Returns [`ProcessError::Signal`] when the signal fails for a reason
    /// other than the process having exited, and
    /// [`ProcessError::RecordRemove`] when the record cannot be deleted.
    pub fn kill(self, launcher: &dyn Launcher) -> Result<(), ProcessError> {
        launcher.terminate(self.pid)?;
        info!(
            target: PROCESS_TARGET,
            entity = self.name.as_str(),
            pid = self.pid,
            "terminated child"
        );
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ProcessError::RecordRemove {
                path: self.path,
                source,
            }),
        }
    }
}
