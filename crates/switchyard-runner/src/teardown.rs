//! Best-effort teardown in reverse bring-up order.

use tracing::{info, warn};

use switchyard_process::Launcher;
use switchyard_topology::{Entity, SwitchManager, Topology};

use crate::RUNNER_TARGET;

/// Shuts every entity down, walking the bring-up order backwards.
///
/// Failures are logged and skipped so one stuck entity never leaves the
/// rest of the session running.
pub(crate) fn tear_down(topology: &Topology, manager: &SwitchManager, launcher: &dyn Launcher) {
    info!(target: RUNNER_TARGET, "tearing session down");
    let mut targets: Vec<&dyn Entity> = Vec::new();
    targets.extend(topology.apps().values().rev().map(|app| app as &dyn Entity));
    for switch in topology.switches().values().rev() {
        targets.push(switch);
    }
    for host in topology.hosts().values().rev() {
        targets.push(host);
    }
    for link in topology.links().iter().rev() {
        targets.push(link);
    }
    if let Some(filter) = topology.packetin_filter() {
        targets.push(filter);
    }
    targets.push(manager);
    if let Some(tracer) = topology.tracer() {
        targets.push(tracer);
    }
    for entity in targets {
        if let Err(error) = entity.shutdown(launcher) {
            warn!(
                target: RUNNER_TARGET,
                kind = %entity.kind(),
                entity = entity.name(),
                %error,
                "teardown step failed; continuing"
            );
        }
    }
}
