//! The uniform lifecycle contract every entity kind implements.

use std::fmt;

use tracing::debug;

use switchyard_config::RuntimePaths;
use switchyard_process::{Launcher, ProcessError, ProcessRecord};

use crate::TOPOLOGY_TARGET;
use crate::errors::EntityError;

/// Kind of an orchestrated entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Controller application.
    App,
    /// Virtual host.
    Host,
    /// Virtual cable.
    Link,
    /// Packet-in filter daemon.
    PacketinFilter,
    /// Virtual OpenFlow switch.
    Switch,
    /// Event router the switches connect to.
    SwitchManager,
    /// Packet-trace sidecar.
    Tracer,
}

impl EntityKind {
    /// Human-readable kind name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Host => "host",
            Self::Link => "link",
            Self::PacketinFilter => "packetin filter",
            Self::Switch => "switch",
            Self::SwitchManager => "switch manager",
            Self::Tracer => "tracer",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Uniform lifecycle facade over every entity kind.
///
/// The driver only speaks this contract; how a given kind invokes its
/// backing binary is the wrapper's business.
pub trait Entity {
    /// Unique name within the entity's kind.
    fn name(&self) -> &str;

    /// Kind of the entity, for diagnostics.
    fn kind(&self) -> EntityKind;

    /// Starts the entity detached from the orchestrator's control flow.
    fn daemonize(&self, launcher: &dyn Launcher) -> Result<(), EntityError>;

    /// Starts the entity in the orchestrator's foreground, blocking until it
    /// exits. Kinds without a meaningful foreground mode fall back to
    /// daemonisation.
    fn start(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        self.daemonize(launcher)
    }

    /// Stops the entity. Idempotent: an entity that was never started, or
    /// whose process already exited, shuts down successfully.
    fn shutdown(&self, launcher: &dyn Launcher) -> Result<(), EntityError>;

    /// Readiness probe. Kinds without one report ready unconditionally.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Kills the recorded process for the named entity, treating a missing
/// record as "nothing to kill".
pub(crate) fn kill_recorded(
    paths: &RuntimePaths,
    prefix: &str,
    kind: EntityKind,
    name: &str,
    launcher: &dyn Launcher,
) -> Result<(), EntityError> {
    match ProcessRecord::read(paths, prefix, name) {
        Ok(record) => record
            .kill(launcher)
            .map_err(|source| EntityError::process(kind, name, source)),
        Err(ProcessError::MissingRecord { .. }) => {
            debug!(
                target: TOPOLOGY_TARGET,
                kind = %kind,
                entity = name,
                "no pid record; nothing to kill"
            );
            Ok(())
        }
        Err(source) => Err(EntityError::process(kind, name, source)),
    }
}
