//! Virtual OpenFlow switch wrapper over the `ovs-openflowd` daemon.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use switchyard_config::{Executable, RuntimePaths, SwitchStanza};
use switchyard_process::{Invocation, Launcher, ProcessRecord, ReadinessProbe};

use crate::TOPOLOGY_TARGET;
use crate::entity::{Entity, EntityKind, kill_recorded};
use crate::errors::EntityError;

const PID_PREFIX: &str = "openflowd";

/// Log line the datapath emits once its flow table is installed and it is
/// ready to accept controller connections.
pub const SWITCH_READY_MARKER: &str = "actions=drop";

/// A virtual OpenFlow switch: one userspace datapath dialling back to the
/// event router over TCP.
#[derive(Debug, Clone)]
pub struct Switch {
    stanza: SwitchStanza,
    port: u16,
    interfaces: Vec<String>,
    paths: RuntimePaths,
}

impl Switch {
    /// Wraps a declared switch dialling the control plane on `port`.
    #[must_use]
    pub fn new(stanza: SwitchStanza, port: u16, paths: RuntimePaths) -> Self {
        Self {
            stanza,
            port,
            interfaces: Vec::new(),
            paths,
        }
    }

    /// Declaration record for the switch.
    #[must_use]
    pub fn stanza(&self) -> &SwitchStanza {
        &self.stanza
    }

    /// Datapath device name backing the switch.
    #[must_use]
    pub fn datapath(&self) -> String {
        format!("vsw_{}", self.stanza.name)
    }

    /// Attaches a network interface a link created for this switch.
    pub fn add_interface(&mut self, interface: impl Into<String>) {
        self.interfaces.push(interface.into());
    }

    /// Interfaces attached to the datapath, in attachment order.
    #[must_use]
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    fn log_path(&self) -> PathBuf {
        self.paths.log_path(PID_PREFIX, &self.stanza.name)
    }

    fn probe(&self) -> ReadinessProbe {
        ReadinessProbe::new(self.log_path(), SWITCH_READY_MARKER)
    }

    /// Whether the datapath has logged its readiness marker.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.probe().check()
    }

    /// Blocks until the datapath logs its readiness marker.
    ///
    /// # Errors
    /// Returns [`EntityError::Process`] wrapping a readiness timeout when the
    /// marker never appears within `timeout`.
    pub fn wait_ready(&self, timeout: Duration) -> Result<(), EntityError> {
        self.probe()
            .with_timeout(timeout)
            .wait()
            .map_err(|source| EntityError::process(EntityKind::Switch, &self.stanza.name, source))
    }

    fn spawn_arguments(&self) -> Vec<String> {
        let mut arguments = vec![
            "--out-of-band".to_owned(),
            "--no-resolv-conf".to_owned(),
            "--fail=closed".to_owned(),
            "--inactivity-probe=180".to_owned(),
            "--rate-limit=40000".to_owned(),
            "--burst-limit=20000".to_owned(),
            format!("--datapath-id={}", self.stanza.dpid),
            "--verbose=ANY:file:dbg".to_owned(),
            format!("--log-file={}", self.log_path().display()),
        ];
        if !self.interfaces.is_empty() {
            arguments.push(format!("--ports={}", self.interfaces.join(",")));
        }
        arguments.push(format!("netdev@{}", self.datapath()));
        arguments.push(format!("tcp:{}:{}", self.stanza.ip, self.port));
        arguments
    }
}

impl Entity for Switch {
    fn name(&self) -> &str {
        &self.stanza.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Switch
    }

    fn daemonize(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        // A stale log from an earlier session would satisfy the readiness
        // probe before the new datapath is actually up.
        if let Err(error) = fs::remove_file(self.log_path())
            && error.kind() != io::ErrorKind::NotFound
        {
            debug!(
                target: TOPOLOGY_TARGET,
                switch = self.stanza.name.as_str(),
                %error,
                "could not remove stale datapath log"
            );
        }
        let invocation =
            Invocation::new(Executable::SwitchDaemon.resolve()).args(self.spawn_arguments());
        let pid = launcher
            .spawn(&invocation)
            .map_err(|source| EntityError::process(EntityKind::Switch, &self.stanza.name, source))?;
        ProcessRecord::record(&self.paths, PID_PREFIX, &self.stanza.name, pid).map_err(
            |source| EntityError::process(EntityKind::Switch, &self.stanza.name, source),
        )?;
        info!(
            target: TOPOLOGY_TARGET,
            switch = self.stanza.name.as_str(),
            dpid = self.stanza.dpid.as_str(),
            datapath = self.datapath(),
            "switch up"
        );
        Ok(())
    }

    fn shutdown(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        kill_recorded(
            &self.paths,
            PID_PREFIX,
            EntityKind::Switch,
            &self.stanza.name,
            launcher,
        )
    }

    fn is_ready(&self) -> bool {
        self.is_up()
    }
}
