//! The session driver: phase-ordered bring-up, session wait, teardown.

use std::time::Duration;

use tracing::info;

use switchyard_process::Launcher;
use switchyard_topology::{Entity, SwitchManager, Topology, resolve_rule};

use crate::RUNNER_TARGET;
use crate::errors::{Phase, RunnerError};
use crate::interrupt::InterruptSignal;
use crate::teardown::tear_down;

const DEFAULT_SWITCH_TIMEOUT: Duration = Duration::from_secs(10);

/// How an orchestration session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The foreground application exited on its own, or no application was
    /// declared and bring-up finished.
    Completed,
    /// An interrupt ended the foreground application.
    Interrupted,
}

/// Drives one topology through a full session.
///
/// Bring-up follows a fixed phase order: the trace sidecar first so it
/// observes everything, then the event router, the packet-in filter, the
/// virtual cables, the hosts, the switches (each waited on for readiness),
/// ARP population across hosts, and finally the controller applications.
/// Teardown is a separate explicit pass that walks the same entities in
/// reverse and keeps going past individual failures.
pub struct Runner<'a> {
    launcher: &'a dyn Launcher,
    interrupt: &'a dyn InterruptSignal,
    switch_timeout: Duration,
}

impl<'a> Runner<'a> {
    /// Builds a driver over the given process and interrupt seams.
    #[must_use]
    pub fn new(launcher: &'a dyn Launcher, interrupt: &'a dyn InterruptSignal) -> Self {
        Self {
            launcher,
            interrupt,
            switch_timeout: DEFAULT_SWITCH_TIMEOUT,
        }
    }

    /// Overrides how long each switch may take to become ready.
    #[must_use]
    pub const fn with_switch_timeout(mut self, timeout: Duration) -> Self {
        self.switch_timeout = timeout;
        self
    }

    /// Runs a full foreground session.
    ///
    /// When apps are declared the last one holds the foreground and the
    /// session ends when it exits; the interrupt observer then tells a
    /// clean interruption apart from an app failure. Without apps the call
    /// returns as soon as bring-up finishes. No teardown happens
    /// automatically: started entities stay up for inspection or an
    /// explicit [`Runner::tear_down`] pass, which the durable pid records
    /// support even from a later invocation.
    ///
    /// # Errors
    /// Returns the first bring-up or session failure. A failure aborts the
    /// remaining steps but leaves already-started entities running.
    pub fn run(&self, topology: &Topology) -> Result<SessionOutcome, RunnerError> {
        let manager = self.prepare(topology)?;
        self.bring_up(topology, &manager, true)?;
        self.hold_session(topology)
    }

    /// Brings the whole topology up detached and returns immediately,
    /// leaving the session running. Every app is daemonised; nothing holds
    /// the foreground and no teardown is performed.
    ///
    /// # Errors
    /// Returns the first bring-up failure, leaving already-started entities
    /// running.
    pub fn daemonize(&self, topology: &Topology) -> Result<(), RunnerError> {
        let manager = self.prepare(topology)?;
        self.bring_up(topology, &manager, false)
    }

    /// Tears the session down using the durable pid records, best-effort.
    /// Entities that never started, or whose process already exited, are
    /// skipped silently.
    pub fn tear_down(&self, topology: &Topology) {
        let manager = topology.switch_manager().cloned().unwrap_or_else(|| {
            SwitchManager::from_rule(
                switchyard_config::EventRule::default(),
                topology.port(),
                topology.paths().clone(),
            )
        });
        tear_down(topology, &manager, self.launcher);
    }

    fn prepare(&self, topology: &Topology) -> Result<SwitchManager, RunnerError> {
        // Routing must resolve before anything is spawned so an ambiguous
        // topology fails with zero side effects.
        let rule = resolve_rule(topology)?;
        topology.paths().prepare()?;
        Ok(SwitchManager::from_rule(
            rule,
            topology.port(),
            topology.paths().clone(),
        ))
    }

    fn bring_up(
        &self,
        topology: &Topology,
        manager: &SwitchManager,
        hold_last_app: bool,
    ) -> Result<(), RunnerError> {
        info!(
            target: RUNNER_TARGET,
            hosts = topology.hosts().len(),
            switches = topology.switches().len(),
            links = topology.links().len(),
            apps = topology.app_count(),
            "bringing session up"
        );
        if let Some(tracer) = topology.tracer() {
            tracer
                .daemonize(self.launcher)
                .map_err(RunnerError::bring_up(Phase::Tracer))?;
        }
        manager
            .daemonize(self.launcher)
            .map_err(RunnerError::bring_up(Phase::SwitchManager))?;
        if let Some(filter) = topology.packetin_filter() {
            filter
                .daemonize(self.launcher)
                .map_err(RunnerError::bring_up(Phase::PacketinFilter))?;
        }
        for link in topology.links() {
            // Delete first so devices left by a crashed predecessor cannot
            // collide with the new pair.
            link.down(self.launcher);
            link.up(self.launcher)
                .map_err(RunnerError::bring_up(Phase::Links))?;
        }
        for host in topology.hosts().values() {
            host.daemonize(self.launcher)
                .map_err(RunnerError::bring_up(Phase::Hosts))?;
        }
        for switch in topology.switches().values() {
            switch
                .daemonize(self.launcher)
                .map_err(RunnerError::bring_up(Phase::Switches))?;
            switch
                .wait_ready(self.switch_timeout)
                .map_err(RunnerError::bring_up(Phase::Switches))?;
        }
        for host in topology.hosts().values() {
            for peer in topology.hosts().values() {
                if peer.name() == host.name() {
                    continue;
                }
                host.add_arp_entry(peer, self.launcher)
                    .map_err(RunnerError::bring_up(Phase::Arp))?;
            }
        }
        let detached = if hold_last_app {
            topology.app_count().saturating_sub(1)
        } else {
            topology.app_count()
        };
        for app in topology.apps().values().take(detached) {
            app.daemonize(self.launcher)
                .map_err(RunnerError::bring_up(Phase::Apps))?;
        }
        Ok(())
    }

    fn hold_session(&self, topology: &Topology) -> Result<SessionOutcome, RunnerError> {
        let Some(last) = topology.apps().values().last() else {
            info!(target: RUNNER_TARGET, "no apps declared; session left running");
            return Ok(SessionOutcome::Completed);
        };
        let result = last.start(self.launcher);
        if self.interrupt.fired() {
            // The signal took the foreground child down with the session;
            // its exit status does not count as an app failure.
            info!(target: RUNNER_TARGET, app = last.name(), "session interrupted");
            return Ok(SessionOutcome::Interrupted);
        }
        result.map_err(RunnerError::Foreground)?;
        info!(target: RUNNER_TARGET, app = last.name(), "foreground app exited");
        Ok(SessionOutcome::Completed)
    }
}
