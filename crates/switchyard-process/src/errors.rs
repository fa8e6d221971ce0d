//! Error taxonomy for process launch, records, and readiness.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

/// Errors surfaced while launching or supervising child processes.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Spawning the child binary failed.
    #[error("failed to spawn '{program:?}': {source}")]
    Spawn {
        /// Binary that could not be spawned.
        program: OsString,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Waiting on a foreground child failed.
    #[error("failed to wait for '{program:?}': {source}")]
    Wait {
        /// Binary being waited on.
        program: OsString,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A foreground child exited unsuccessfully.
    #[error("'{program:?}' exited with status {code:?}")]
    Exit {
        /// Binary that failed.
        program: OsString,
        /// Exit code, if the child was not killed by a signal.
        code: Option<i32>,
    },
    /// Opening the log artefact for child output failed.
    #[error("failed to open log artefact '{path}': {source}")]
    LogOpen {
        /// Log path that could not be opened.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Persisting a pid record failed.
    #[error("failed to write pid record '{path}': {source}")]
    RecordWrite {
        /// Record path that could not be written.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// No pid record exists for the entity.
    #[error("no pid record for '{name}' at '{path}'")]
    MissingRecord {
        /// Entity the record was requested for.
        name: String,
        /// Path that was consulted.
        path: PathBuf,
    },
    /// Reading an existing pid record failed.
    #[error("failed to read pid record '{path}': {source}")]
    RecordRead {
        /// Record path that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A pid record held something other than a process id.
    #[error("pid record '{path}' is malformed")]
    MalformedRecord {
        /// Record path holding the malformed content.
        path: PathBuf,
    },
    /// Removing a pid record failed.
    #[error("failed to remove pid record '{path}': {source}")]
    RecordRemove {
        /// Record path that could not be removed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Signalling a recorded pid failed for a reason other than the
    /// process having already exited.
    #[error("failed to signal pid {pid}: {source}")]
    Signal {
        /// Process id the signal was aimed at.
        pid: u32,
        /// Underlying OS error.
        source: Errno,
    },
    /// The readiness marker did not appear within the deadline.
    #[error("'{marker}' not found in '{log}' within {timeout_ms} ms")]
    ReadinessTimeout {
        /// Marker line that was being polled for.
        marker: String,
        /// Log artefact that was polled.
        log: PathBuf,
        /// Deadline that expired.
        timeout_ms: u64,
    },
}
