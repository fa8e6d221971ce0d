//! Virtual host wrapper over the `vhost` daemon and its CLI.

use tracing::info;

use switchyard_config::{Executable, HostStanza, RuntimePaths};
use switchyard_process::{Invocation, Launcher, ProcessRecord};

use crate::TOPOLOGY_TARGET;
use crate::entity::{Entity, EntityKind, kill_recorded};
use crate::errors::EntityError;

const PID_PREFIX: &str = "vhost";

/// Traffic counters the host CLI reports for one flow, one row per
/// source/destination pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficStats {
    /// Destination IPv4 address.
    pub ip_dst: String,
    /// Destination transport port.
    pub tp_dst: u16,
    /// Source IPv4 address.
    pub ip_src: String,
    /// Source transport port.
    pub tp_src: u16,
    /// Packets counted.
    pub n_pkts: u64,
    /// Octets counted.
    pub n_octets: u64,
}

/// A virtual host: one network endpoint daemon plus the CLI that configures
/// its addresses and ARP table.
#[derive(Debug, Clone)]
pub struct Host {
    stanza: HostStanza,
    interface: Option<String>,
    paths: RuntimePaths,
}

impl Host {
    /// Wraps a declared host.
    #[must_use]
    pub fn new(stanza: HostStanza, paths: RuntimePaths) -> Self {
        Self {
            stanza,
            interface: None,
            paths,
        }
    }

    /// Declaration record for the host.
    #[must_use]
    pub fn stanza(&self) -> &HostStanza {
        &self.stanza
    }

    /// IPv4 address of the host interface.
    #[must_use]
    pub fn ip(&self) -> &str {
        &self.stanza.ip
    }

    /// MAC address of the host interface.
    #[must_use]
    pub fn mac(&self) -> &str {
        &self.stanza.mac
    }

    /// Wires the host to the network interface a link created for it.
    pub fn set_interface(&mut self, interface: impl Into<String>) {
        self.interface = Some(interface.into());
    }

    /// Interface the host daemon binds; falls back to the host name until a
    /// link wires a veth end to it.
    #[must_use]
    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or(&self.stanza.name)
    }

    fn cli(&self) -> Invocation {
        Invocation::new(Executable::HostCli.resolve())
            .arg("-i")
            .arg(self.interface())
    }

    /// Assigns the declared IP, netmask, and MAC to the running daemon.
    pub(crate) fn configure_address(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        let invocation = self
            .cli()
            .arg("set_host_addr")
            .arg("--ip-addr")
            .arg(&self.stanza.ip)
            .arg("--ip-mask")
            .arg(&self.stanza.netmask)
            .arg("--mac-addr")
            .arg(&self.stanza.mac);
        launcher
            .run(&invocation)
            .map_err(|source| EntityError::process(EntityKind::Host, &self.stanza.name, source))
    }

    pub(crate) fn enable_promisc(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        let invocation = self.cli().arg("enable_promisc");
        launcher
            .run(&invocation)
            .map_err(|source| EntityError::process(EntityKind::Host, &self.stanza.name, source))
    }

    /// Installs the peer's address mapping into this host's ARP table.
    ///
    /// The driver calls this once per *other* host after all switches are
    /// up; a host never holds an entry for itself.
    pub fn add_arp_entry(&self, peer: &Self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        let invocation = self
            .cli()
            .arg("add_arp_entry")
            .arg("--ip-addr")
            .arg(peer.ip())
            .arg("--mac-addr")
            .arg(peer.mac());
        launcher
            .run(&invocation)
            .map_err(|source| EntityError::process(EntityKind::Host, &self.stanza.name, source))
    }

    /// Sends a stream of test packets to the peer host, at `pps` packets per
    /// second when given.
    pub fn send_packets(
        &self,
        dest: &Self,
        pps: Option<u32>,
        launcher: &dyn Launcher,
    ) -> Result<(), EntityError> {
        let mut invocation = self
            .cli()
            .arg("send_packets")
            .arg("--ip-src")
            .arg(self.ip())
            .arg("--ip-dst")
            .arg(dest.ip());
        if let Some(pps) = pps {
            invocation = invocation.arg("--pps").arg(pps.to_string());
        }
        launcher
            .run(&invocation)
            .map_err(|source| EntityError::process(EntityKind::Host, &self.stanza.name, source))
    }

    /// Transmit-side counters for traffic this host originated.
    ///
    /// # Errors
    /// Fails when the CLI cannot be run or answers with unparseable output.
    pub fn tx_stats(&self, launcher: &dyn Launcher) -> Result<Vec<TrafficStats>, EntityError> {
        self.stats("--tx", launcher)
    }

    /// Receive-side counters for traffic delivered to this host.
    ///
    /// # Errors
    /// Fails when the CLI cannot be run or answers with unparseable output.
    pub fn rx_stats(&self, launcher: &dyn Launcher) -> Result<Vec<TrafficStats>, EntityError> {
        self.stats("--rx", launcher)
    }

    fn stats(&self, side: &str, launcher: &dyn Launcher) -> Result<Vec<TrafficStats>, EntityError> {
        let invocation = self.cli().arg("show_stats").arg(side);
        let output = launcher
            .capture(&invocation)
            .map_err(|source| EntityError::process(EntityKind::Host, &self.stanza.name, source))?;
        output
            .lines()
            .map(str::trim)
            // The CLI repeats the column header before the counter rows.
            .filter(|line| !line.is_empty() && !line.starts_with("ip_dst"))
            .map(|line| self.parse_stats_line(line))
            .collect()
    }

    fn parse_stats_line(&self, line: &str) -> Result<TrafficStats, EntityError> {
        let malformed = || EntityError::MalformedStats {
            kind: EntityKind::Host,
            name: self.stanza.name.clone(),
            line: line.to_owned(),
        };
        let fields: Vec<&str> = line.split(',').collect();
        let &[ip_dst, tp_dst, ip_src, tp_src, n_pkts, n_octets] = fields.as_slice() else {
            return Err(malformed());
        };
        Ok(TrafficStats {
            ip_dst: ip_dst.to_owned(),
            tp_dst: tp_dst.parse().map_err(|_| malformed())?,
            ip_src: ip_src.to_owned(),
            tp_src: tp_src.parse().map_err(|_| malformed())?,
            n_pkts: n_pkts.parse().map_err(|_| malformed())?,
            n_octets: n_octets.parse().map_err(|_| malformed())?,
        })
    }
}

impl Entity for Host {
    fn name(&self) -> &str {
        &self.stanza.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Host
    }

    fn daemonize(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        let invocation = Invocation::new(Executable::HostDaemon.resolve())
            .arg("-i")
            .arg(self.interface())
            .log_to(self.paths.log_path(PID_PREFIX, &self.stanza.name));
        let pid = launcher
            .spawn(&invocation)
            .map_err(|source| EntityError::process(EntityKind::Host, &self.stanza.name, source))?;
        ProcessRecord::record(&self.paths, PID_PREFIX, &self.stanza.name, pid)
            .map_err(|source| EntityError::process(EntityKind::Host, &self.stanza.name, source))?;
        self.configure_address(launcher)?;
        if self.stanza.promisc {
            self.enable_promisc(launcher)?;
        }
        info!(
            target: TOPOLOGY_TARGET,
            host = self.stanza.name.as_str(),
            ip = self.stanza.ip.as_str(),
            promisc = self.stanza.promisc,
            "host up"
        );
        Ok(())
    }

    fn shutdown(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        kill_recorded(
            &self.paths,
            PID_PREFIX,
            EntityKind::Host,
            &self.stanza.name,
            launcher,
        )
    }
}
