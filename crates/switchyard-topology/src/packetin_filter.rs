//! Packet-in filter wrapper.

use tracing::info;

use switchyard_config::{Executable, PacketinFilterStanza, RuntimePaths};
use switchyard_process::{Invocation, Launcher, ProcessRecord};

use crate::TOPOLOGY_TARGET;
use crate::entity::{Entity, EntityKind, kill_recorded};
use crate::errors::EntityError;

const PID_PREFIX: &str = "filter";

/// A filter daemon splitting packet-in events between an LLDP receiver and a
/// catch-all receiver before they reach the apps.
#[derive(Debug, Clone)]
pub struct PacketinFilter {
    stanza: PacketinFilterStanza,
    paths: RuntimePaths,
}

impl PacketinFilter {
    /// Wraps a declared filter.
    #[must_use]
    pub fn new(stanza: PacketinFilterStanza, paths: RuntimePaths) -> Self {
        Self { stanza, paths }
    }

    /// Declaration record for the filter.
    #[must_use]
    pub fn stanza(&self) -> &PacketinFilterStanza {
        &self.stanza
    }
}

impl Entity for PacketinFilter {
    fn name(&self) -> &str {
        &self.stanza.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::PacketinFilter
    }

    fn daemonize(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        let invocation = Invocation::new(Executable::PacketinFilter.resolve())
            .arg("--name")
            .arg(&self.stanza.name)
            .arg(format!("lldp::{}", self.stanza.lldp))
            .arg(format!("packet_in::{}", self.stanza.packet_in))
            .log_to(self.paths.log_path(PID_PREFIX, &self.stanza.name));
        let pid = launcher.spawn(&invocation).map_err(|source| {
            EntityError::process(EntityKind::PacketinFilter, &self.stanza.name, source)
        })?;
        ProcessRecord::record(&self.paths, PID_PREFIX, &self.stanza.name, pid).map_err(
            |source| EntityError::process(EntityKind::PacketinFilter, &self.stanza.name, source),
        )?;
        info!(
            target: TOPOLOGY_TARGET,
            filter = self.stanza.name.as_str(),
            lldp = self.stanza.lldp.as_str(),
            packet_in = self.stanza.packet_in.as_str(),
            "packet-in filter up"
        );
        Ok(())
    }

    fn shutdown(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        kill_recorded(
            &self.paths,
            PID_PREFIX,
            EntityKind::PacketinFilter,
            &self.stanza.name,
            launcher,
        )
    }
}
