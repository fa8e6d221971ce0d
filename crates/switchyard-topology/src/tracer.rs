//! Packet-trace sidecar wrapper.

use tracing::info;

use switchyard_config::{Executable, RuntimePaths};
use switchyard_process::{Invocation, Launcher, ProcessRecord};

use crate::TOPOLOGY_TARGET;
use crate::entity::{Entity, EntityKind, kill_recorded};
use crate::errors::EntityError;

const PID_PREFIX: &str = "tracer";
const TRACER_NAME: &str = "traceshark";

/// The packet-trace sidecar. Started first so it observes every other
/// entity's traffic from the beginning of the session.
#[derive(Debug, Clone)]
pub struct Tracer {
    paths: RuntimePaths,
}

impl Tracer {
    /// Wraps the trace sidecar for this session.
    #[must_use]
    pub fn new(paths: RuntimePaths) -> Self {
        Self { paths }
    }
}

impl Entity for Tracer {
    fn name(&self) -> &str {
        TRACER_NAME
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Tracer
    }

    fn daemonize(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        let invocation = Invocation::new(Executable::Tracer.resolve())
            .log_to(self.paths.log_path(PID_PREFIX, TRACER_NAME));
        let pid = launcher
            .spawn(&invocation)
            .map_err(|source| EntityError::process(EntityKind::Tracer, TRACER_NAME, source))?;
        ProcessRecord::record(&self.paths, PID_PREFIX, TRACER_NAME, pid)
            .map_err(|source| EntityError::process(EntityKind::Tracer, TRACER_NAME, source))?;
        info!(target: TOPOLOGY_TARGET, "trace sidecar up");
        Ok(())
    }

    fn shutdown(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        kill_recorded(&self.paths, PID_PREFIX, EntityKind::Tracer, TRACER_NAME, launcher)
    }
}
