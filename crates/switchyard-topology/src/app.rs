//! Controller application wrapper.

use tracing::info;

use switchyard_config::{AppStanza, RuntimePaths};
use switchyard_process::{Invocation, Launcher, ProcessRecord};

use crate::TOPOLOGY_TARGET;
use crate::entity::{Entity, EntityKind, kill_recorded};
use crate::errors::EntityError;

const PID_PREFIX: &str = "app";

/// A controller application attached to the event router.
///
/// Apps are the one kind with a meaningful foreground mode: the driver runs
/// the last declared app in the foreground so the session lives as long as
/// it does.
#[derive(Debug, Clone)]
pub struct App {
    stanza: AppStanza,
    paths: RuntimePaths,
}

impl App {
    /// Wraps a declared application.
    #[must_use]
    pub fn new(stanza: AppStanza, paths: RuntimePaths) -> Self {
        Self { stanza, paths }
    }

    /// Declaration record for the application.
    #[must_use]
    pub fn stanza(&self) -> &AppStanza {
        &self.stanza
    }

    fn invocation(&self) -> Invocation {
        Invocation::new(&self.stanza.command)
            .arg("--name")
            .arg(&self.stanza.name)
            .args(self.stanza.options.iter().cloned())
            .log_to(self.paths.log_path(PID_PREFIX, &self.stanza.name))
    }
}

impl Entity for App {
    fn name(&self) -> &str {
        &self.stanza.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::App
    }

    fn daemonize(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        let pid = launcher
            .spawn(&self.invocation())
            .map_err(|source| EntityError::process(EntityKind::App, &self.stanza.name, source))?;
        ProcessRecord::record(&self.paths, PID_PREFIX, &self.stanza.name, pid)
            .map_err(|source| EntityError::process(EntityKind::App, &self.stanza.name, source))?;
        info!(
            target: TOPOLOGY_TARGET,
            app = self.stanza.name.as_str(),
            command = self.stanza.command.as_str(),
            "app detached"
        );
        Ok(())
    }

    fn start(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        info!(
            target: TOPOLOGY_TARGET,
            app = self.stanza.name.as_str(),
            command = self.stanza.command.as_str(),
            "app foreground"
        );
        launcher
            .run(&self.invocation())
            .map_err(|source| EntityError::process(EntityKind::App, &self.stanza.name, source))
    }

    fn shutdown(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        kill_recorded(
            &self.paths,
            PID_PREFIX,
            EntityKind::App,
            &self.stanza.name,
            launcher,
        )
    }
}
