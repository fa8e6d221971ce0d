//! The event router every switch dials back to.

use tracing::info;

use switchyard_config::{EventRule, Executable, RuntimePaths, SwitchManagerStanza};
use switchyard_process::{Invocation, Launcher, ProcessRecord};

use crate::TOPOLOGY_TARGET;
use crate::entity::{Entity, EntityKind, kill_recorded};
use crate::errors::EntityError;

const PID_PREFIX: &str = "manager";

/// Well-known name of the single event router instance.
pub const SWITCH_MANAGER_NAME: &str = "switch_manager";

/// The event router daemon, materialised from either an explicit declaration
/// or a derived routing rule.
#[derive(Debug, Clone)]
pub struct SwitchManager {
    rule: EventRule,
    port: u16,
    paths: RuntimePaths,
}

impl SwitchManager {
    /// Materialises the router from an explicit declaration.
    #[must_use]
    pub fn from_stanza(stanza: SwitchManagerStanza, port: u16, paths: RuntimePaths) -> Self {
        Self::from_rule(stanza.rule, port, paths)
    }

    /// Materialises the router from a derived routing rule.
    #[must_use]
    pub fn from_rule(rule: EventRule, port: u16, paths: RuntimePaths) -> Self {
        Self { rule, port, paths }
    }

    /// Routing rule the router enforces.
    #[must_use]
    pub fn rule(&self) -> &EventRule {
        &self.rule
    }

    /// Control-plane port the router listens on.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Entity for SwitchManager {
    fn name(&self) -> &str {
        SWITCH_MANAGER_NAME
    }

    fn kind(&self) -> EntityKind {
        EntityKind::SwitchManager
    }

    fn daemonize(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        let invocation = Invocation::new(Executable::SwitchManager.resolve())
            .arg("--port")
            .arg(self.port.to_string())
            .args(self.rule.to_args())
            .log_to(self.paths.log_path(PID_PREFIX, SWITCH_MANAGER_NAME));
        let pid = launcher.spawn(&invocation).map_err(|source| {
            EntityError::process(EntityKind::SwitchManager, SWITCH_MANAGER_NAME, source)
        })?;
        ProcessRecord::record(&self.paths, PID_PREFIX, SWITCH_MANAGER_NAME, pid).map_err(
            |source| EntityError::process(EntityKind::SwitchManager, SWITCH_MANAGER_NAME, source),
        )?;
        info!(
            target: TOPOLOGY_TARGET,
            port = self.port,
            rule = ?self.rule.to_args(),
            "switch manager up"
        );
        Ok(())
    }

    fn shutdown(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        kill_recorded(
            &self.paths,
            PID_PREFIX,
            EntityKind::SwitchManager,
            SWITCH_MANAGER_NAME,
            launcher,
        )
    }
}
