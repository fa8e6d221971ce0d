//! Shared fixtures for the session driver tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use switchyard_config::{AppStanza, HostStanza, SwitchStanza};

use crate::interrupt::InterruptSignal;

/// Interrupt double reporting that no signal ever arrived.
pub(crate) struct IdleInterrupt;

impl InterruptSignal for IdleInterrupt {
    fn fired(&self) -> bool {
        false
    }
}

/// Interrupt double reporting that a signal was delivered.
pub(crate) struct FiredInterrupt;

impl InterruptSignal for FiredInterrupt {
    fn fired(&self) -> bool {
        true
    }
}

pub(crate) fn host_stanza(name: &str, ip: &str, mac: &str) -> HostStanza {
    HostStanza {
        name: name.to_owned(),
        ip: ip.to_owned(),
        netmask: "255.255.255.0".to_owned(),
        mac: mac.to_owned(),
        promisc: false,
        extras: BTreeMap::new(),
    }
}

pub(crate) fn switch_stanza(name: &str) -> SwitchStanza {
    SwitchStanza {
        name: name.to_owned(),
        ip: "127.0.0.1".to_owned(),
        dpid: "0000000000000001".to_owned(),
        extras: BTreeMap::new(),
    }
}

pub(crate) fn app_stanza(name: &str) -> AppStanza {
    AppStanza {
        name: name.to_owned(),
        command: format!("/opt/apps/{name}"),
        options: Vec::new(),
        extras: BTreeMap::new(),
    }
}

/// Keeps a switch readiness marker present in the given log file until
/// dropped.
///
/// Switch bring-up clears stale logs before spawning, so a marker written
/// up front would vanish; this rewrites it on a short interval instead, the
/// way a real datapath would repopulate its log.
pub(crate) struct ReadyMarker {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ReadyMarker {
    pub(crate) fn keep_written(path: PathBuf) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            while !flag.load(Ordering::SeqCst) {
                let _ = fs::write(&path, b"flow table installed: actions=drop\n");
                thread::sleep(Duration::from_millis(10));
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for ReadyMarker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
