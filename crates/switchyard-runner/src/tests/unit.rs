//! Unit tests for the session driver.

use std::time::Duration;

use switchyard_config::{
    EventRule, LinkStanza, LogConfig, LogFormat, RuntimePaths, SwitchManagerStanza,
};
use switchyard_process::recording::{CallMode, RecordingLauncher};
use switchyard_topology::Topology;
use tempfile::TempDir;

use crate::errors::{Phase, RunnerError};
use crate::runner::{Runner, SessionOutcome};
use crate::telemetry::{self, TelemetryError};
use crate::tests::support::{self, FiredInterrupt, IdleInterrupt, ReadyMarker};

fn session_topology() -> (TempDir, Topology) {
    let dir = TempDir::new().unwrap();
    let topology = Topology::new(RuntimePaths::new(dir.path()));
    (dir, topology)
}

fn terminated_pids(launcher: &RecordingLauncher) -> Vec<String> {
    launcher
        .calls()
        .into_iter()
        .filter(|call| call.mode == CallMode::Terminate)
        .map(|call| call.args.join(""))
        .collect()
}

#[test]
fn bring_up_follows_the_phase_order() {
    let (_dir, mut topology) = session_topology();
    topology.add_switch(support::switch_stanza("switch1")).unwrap();
    for (name, ip, mac) in [
        ("host1", "192.168.0.1", "00:00:00:00:00:01"),
        ("host2", "192.168.0.2", "00:00:00:00:00:02"),
        ("host3", "192.168.0.3", "00:00:00:00:00:03"),
    ] {
        topology.add_host(support::host_stanza(name, ip, mac)).unwrap();
    }
    topology.add_link(LinkStanza {
        peers: ("switch1".to_owned(), "host1".to_owned()),
    });

    let marker = ReadyMarker::keep_written(topology.paths().log_path("openflowd", "switch1"));
    let launcher = RecordingLauncher::new();
    let runner = Runner::new(&launcher, &IdleInterrupt);
    let outcome = runner.run(&topology).unwrap();
    drop(marker);
    assert_eq!(outcome, SessionOutcome::Completed);
    assert!(
        terminated_pids(&launcher).is_empty(),
        "the session itself never terminates anything"
    );
    runner.tear_down(&topology);

    let rendered = launcher.rendered();
    let position = |needle: &str| {
        rendered
            .iter()
            .position(|line| line.contains(needle))
            .unwrap_or_else(|| panic!("missing call: {needle}"))
    };

    let manager = position("switch_manager --port 6633");
    let link_clear = position("ip link delete syd0-0");
    let link_add = position("ip link add name syd0-0");
    let first_host = position("vhost -i");
    let switch = position("ovs-openflowd");
    let first_arp = position("add_arp_entry");
    assert!(manager < link_clear, "event router starts first");
    assert!(link_clear < link_add, "stale devices are cleared before adding");
    assert!(link_add < first_host, "cables exist before hosts attach");
    assert!(first_host < switch, "hosts come up before switches");
    assert!(switch < first_arp, "arp waits for the switches");

    // Three hosts learn each other's addresses, never their own.
    let arp: Vec<&String> = rendered
        .iter()
        .filter(|line| line.contains("add_arp_entry"))
        .collect();
    assert_eq!(arp.len(), 6);
    for (interface, own_ip) in [
        ("syd0-1", "192.168.0.1"),
        ("host2", "192.168.0.2"),
        ("host3", "192.168.0.3"),
    ] {
        assert!(
            !arp.iter().any(|line| {
                line.contains(&format!("-i {interface}"))
                    && line.contains(&format!("--ip-addr {own_ip}"))
            }),
            "host on {interface} must not learn its own address"
        );
    }

    // Explicit teardown walks bring-up backwards: switch, hosts reversed,
    // then the event router.
    assert_eq!(
        terminated_pids(&launcher),
        vec!["40004", "40003", "40002", "40001", "40000"]
    );
    let deletes = launcher
        .rendered()
        .iter()
        .filter(|line| *line == "ip link delete syd0-0")
        .count();
    assert_eq!(deletes, 2, "link cleared once at bring-up, once at teardown");
}

#[test]
fn ambiguous_routing_fails_before_any_spawn() {
    let (_dir, mut topology) = session_topology();
    topology.add_app(support::app_stanza("hub")).unwrap();
    topology.add_app(support::app_stanza("inspector")).unwrap();

    let launcher = RecordingLauncher::new();
    let error = Runner::new(&launcher, &IdleInterrupt)
        .run(&topology)
        .unwrap_err();

    assert!(matches!(error, RunnerError::Resolve(_)));
    assert!(launcher.calls().is_empty(), "nothing may spawn: {:?}", launcher.calls());
}

#[test]
fn the_last_app_holds_the_foreground() {
    let (_dir, mut topology) = session_topology();
    topology.set_switch_manager(SwitchManagerStanza {
        rule: EventRule::unicast("inspector"),
    });
    topology.add_app(support::app_stanza("hub")).unwrap();
    topology.add_app(support::app_stanza("inspector")).unwrap();

    let launcher = RecordingLauncher::new();
    let outcome = Runner::new(&launcher, &IdleInterrupt)
        .run(&topology)
        .unwrap();
    assert_eq!(outcome, SessionOutcome::Completed);

    let calls = launcher.calls();
    let hub = calls
        .iter()
        .position(|call| call.rendered().contains("/opt/apps/hub"))
        .unwrap();
    let inspector = calls
        .iter()
        .position(|call| call.rendered().contains("/opt/apps/inspector"))
        .unwrap();
    assert_eq!(calls[hub].mode, CallMode::Spawn);
    assert_eq!(calls[inspector].mode, CallMode::Run);
    assert!(hub < inspector, "detached apps start before the foreground one");
}

#[test]
fn daemonized_sessions_detach_every_app_and_skip_teardown() {
    let (_dir, mut topology) = session_topology();
    topology.set_switch_manager(SwitchManagerStanza {
        rule: EventRule::unicast("inspector"),
    });
    topology.add_app(support::app_stanza("hub")).unwrap();
    topology.add_app(support::app_stanza("inspector")).unwrap();

    let launcher = RecordingLauncher::new();
    Runner::new(&launcher, &IdleInterrupt)
        .daemonize(&topology)
        .unwrap();

    let calls = launcher.calls();
    assert_eq!(calls.len(), 3, "manager plus two detached apps: {calls:?}");
    assert!(calls.iter().all(|call| call.mode == CallMode::Spawn));
}

#[test]
fn standalone_teardown_skips_entities_that_never_started() {
    let (_dir, mut topology) = session_topology();
    topology.add_switch(support::switch_stanza("switch1")).unwrap();
    topology
        .add_host(support::host_stanza("host1", "192.168.0.1", "00:00:00:00:00:01"))
        .unwrap();
    topology.add_link(LinkStanza {
        peers: ("switch1".to_owned(), "host1".to_owned()),
    });

    let launcher = RecordingLauncher::new();
    Runner::new(&launcher, &IdleInterrupt).tear_down(&topology);

    // No pid records exist, so only the cable delete is attempted.
    assert_eq!(launcher.rendered(), vec!["ip link delete syd0-0".to_owned()]);
}

#[test]
fn a_failed_bring_up_leaves_started_entities_for_explicit_teardown() {
    let (_dir, mut topology) = session_topology();
    topology
        .add_host(support::host_stanza("host1", "192.168.0.1", "00:00:00:00:00:01"))
        .unwrap();

    let launcher = RecordingLauncher::new();
    launcher.fail_matching("set_host_addr");
    let runner = Runner::new(&launcher, &IdleInterrupt);
    let error = runner.run(&topology).unwrap_err();

    assert!(matches!(
        error,
        RunnerError::BringUp {
            phase: Phase::Hosts,
            ..
        }
    ));
    assert!(
        terminated_pids(&launcher).is_empty(),
        "no automatic rollback on failure"
    );

    // The host daemon and the manager were already recorded; the explicit
    // pass terminates both, newest first.
    runner.tear_down(&topology);
    assert_eq!(terminated_pids(&launcher), vec!["40001", "40000"]);
}

#[test]
fn a_session_without_apps_returns_once_bring_up_finishes() {
    let (_dir, mut topology) = session_topology();
    topology
        .add_host(support::host_stanza("host1", "192.168.0.1", "00:00:00:00:00:01"))
        .unwrap();

    let launcher = RecordingLauncher::new();
    let outcome = Runner::new(&launcher, &IdleInterrupt).run(&topology).unwrap();

    // App start is a no-op with nothing declared; the call must come back
    // without an interrupt ever arriving.
    assert_eq!(outcome, SessionOutcome::Completed);
    assert!(terminated_pids(&launcher).is_empty());
}

#[test]
fn an_interrupt_ending_the_foreground_app_is_a_clean_outcome() {
    let (_dir, mut topology) = session_topology();
    topology.set_switch_manager(SwitchManagerStanza {
        rule: EventRule::unicast("inspector"),
    });
    topology.add_app(support::app_stanza("inspector")).unwrap();

    // The signal takes the foreground child down, so its run fails with a
    // non-zero status.
    let launcher = RecordingLauncher::new();
    launcher.fail_matching("/opt/apps/inspector");
    let outcome = Runner::new(&launcher, &FiredInterrupt)
        .run(&topology)
        .unwrap();
    assert_eq!(outcome, SessionOutcome::Interrupted);

    // The same failure without an interrupt is the app's own.
    let launcher = RecordingLauncher::new();
    launcher.fail_matching("/opt/apps/inspector");
    let error = Runner::new(&launcher, &IdleInterrupt)
        .run(&topology)
        .unwrap_err();
    assert!(matches!(error, RunnerError::Foreground(_)));
}

#[test]
fn telemetry_accepts_repeat_initialisation() {
    telemetry::initialise(&LogConfig::default()).unwrap();
    telemetry::initialise(&LogConfig::default()).unwrap();
}

#[test]
fn telemetry_rejects_a_malformed_filter() {
    let config = LogConfig {
        filter: "[session".to_owned(),
        format: LogFormat::Json,
    };
    assert!(matches!(
        telemetry::initialise(&config),
        Err(TelemetryError::Filter { .. })
    ));
}

#[test]
fn a_switch_that_never_becomes_ready_aborts_bring_up() {
    let (_dir, mut topology) = session_topology();
    topology.add_switch(support::switch_stanza("switch1")).unwrap();

    let launcher = RecordingLauncher::new();
    let error = Runner::new(&launcher, &IdleInterrupt)
        .with_switch_timeout(Duration::from_millis(50))
        .run(&topology)
        .unwrap_err();

    assert!(matches!(
        error,
        RunnerError::BringUp {
            phase: Phase::Switches,
            ..
        }
    ));
}
