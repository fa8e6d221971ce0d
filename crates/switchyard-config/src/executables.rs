//! Locates the collaborator daemon binaries the orchestrator spawns.

use std::env;
use std::ffi::OsString;

/// Collaborator binary spawned on behalf of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executable {
    /// Virtual host daemon.
    HostDaemon,
    /// Command-line client configuring a running host daemon.
    HostCli,
    /// OpenFlow switch daemon.
    SwitchDaemon,
    /// Event router the switches connect to.
    SwitchManager,
    /// Packet-in filter daemon.
    PacketinFilter,
    /// Packet-trace sidecar.
    Tracer,
    /// Platform `ip` tool used for virtual cabling.
    Ip,
}

impl Executable {
    /// Compiled-in binary name used when no override is present.
    #[must_use]
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::HostDaemon => "vhost",
            Self::HostCli => "vhost-cli",
            Self::SwitchDaemon => "ovs-openflowd",
            Self::SwitchManager => "switch_manager",
            Self::PacketinFilter => "packetin_filter",
            Self::Tracer => "traceshark",
            Self::Ip => "ip",
        }
    }

    /// Environment variable overriding the binary location.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::HostDaemon => "SWITCHYARD_VHOST_BIN",
            Self::HostCli => "SWITCHYARD_VHOST_CLI_BIN",
            Self::SwitchDaemon => "SWITCHYARD_OPENFLOWD_BIN",
            Self::SwitchManager => "SWITCHYARD_SWITCH_MANAGER_BIN",
            Self::PacketinFilter => "SWITCHYARD_PACKETIN_FILTER_BIN",
            Self::Tracer => "SWITCHYARD_TRACESHARK_BIN",
            Self::Ip => "SWITCHYARD_IP_BIN",
        }
    }

    /// Resolves the binary, preferring the environment override.
    #[must_use]
    pub fn resolve(self) -> OsString {
        env::var_os(self.env_var()).unwrap_or_else(|| OsString::from(self.default_name()))
    }
}
