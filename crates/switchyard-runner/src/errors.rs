//! Error types for session orchestration.

use std::fmt;

use thiserror::Error;

use switchyard_config::RuntimePathsError;
use switchyard_topology::{EntityError, ResolveError};

/// Bring-up phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Trace sidecar start.
    Tracer,
    /// Event router start.
    SwitchManager,
    /// Packet-in filter start.
    PacketinFilter,
    /// Virtual cable creation.
    Links,
    /// Host daemon start and address configuration.
    Hosts,
    /// Switch daemon start and readiness wait.
    Switches,
    /// ARP table population across hosts.
    Arp,
    /// Controller application start.
    Apps,
}

impl Phase {
    /// Phase name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tracer => "tracer",
            Self::SwitchManager => "switch manager",
            Self::PacketinFilter => "packet-in filter",
            Self::Links => "links",
            Self::Hosts => "hosts",
            Self::Switches => "switches",
            Self::Arp => "arp",
            Self::Apps => "apps",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Errors raised while driving a session.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The event-routing rule could not be derived.
    #[error("event routing could not be resolved: {0}")]
    Resolve(#[from] ResolveError),
    /// The session runtime directories could not be prepared.
    #[error("runtime directories could not be prepared: {0}")]
    Paths(#[from] RuntimePathsError),
    /// One bring-up phase failed for one entity.
    #[error("{phase} bring-up failed: {source}")]
    BringUp {
        /// Phase that failed.
        phase: Phase,
        /// Entity failure that aborted the phase.
        #[source]
        source: EntityError,
    },
    /// The foreground application failed.
    #[error("foreground app failed: {0}")]
    Foreground(#[source] EntityError),
}

impl RunnerError {
    pub(crate) fn bring_up(phase: Phase) -> impl FnOnce(EntityError) -> Self {
        move |source| Self::BringUp { phase, source }
    }
}
