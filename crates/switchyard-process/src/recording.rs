//! Recording launcher used by workspace tests.
//!
//! Records every invocation in order instead of spawning real children, so
//! phase sequencing and command construction can be asserted hermetically.

use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::errors::ProcessError;
use crate::launcher::{Invocation, Launcher};

/// How an invocation was submitted to the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    /// Detached background spawn.
    Spawn,
    /// Blocking foreground run.
    Run,
    /// Blocking run with captured standard output.
    Capture,
    /// Termination request for a previously spawned pid.
    Terminate,
}

/// One invocation observed by the recording launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Submission mode.
    pub mode: CallMode,
    /// Program name, lossily decoded.
    pub program: String,
    /// Arguments in order, lossily decoded.
    pub args: Vec<String>,
}

impl RecordedCall {
    /// Renders the call the way a shell history would show it.
    #[must_use]
    pub fn rendered(&self) -> String {
        let mut rendered = self.program.clone();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }
}

/// Launcher double that records invocations and hands out synthetic pids.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    calls: Mutex<Vec<RecordedCall>>,
    next_pid: AtomicU32,
    fail_substrings: Mutex<Vec<String>>,
    outputs: Mutex<Vec<(String, String)>>,
}

impl RecordingLauncher {
    /// Builds an empty recording launcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_pid: AtomicU32::new(40_000),
            fail_substrings: Mutex::new(Vec::new()),
            outputs: Mutex::new(Vec::new()),
        }
    }

    /// Makes any invocation whose rendering contains `fragment` fail.
    pub fn fail_matching(&self, fragment: impl Into<String>) {
        if let Ok(mut fail) = self.fail_substrings.lock() {
            fail.push(fragment.into());
        }
    }

    /// Makes any captured invocation whose rendering contains `fragment`
    /// answer with `output`. Unmatched captures answer with an empty string.
    pub fn output_matching(&self, fragment: impl Into<String>, output: impl Into<String>) {
        if let Ok(mut outputs) = self.outputs.lock() {
            outputs.push((fragment.into(), output.into()));
        }
    }

    /// Every recorded invocation in submission order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Rendered command lines in submission order.
    #[must_use]
    pub fn rendered(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(RecordedCall::rendered)
            .collect()
    }

    fn submit(&self, mode: CallMode, invocation: &Invocation) -> Result<String, ProcessError> {
        let call = RecordedCall {
            mode,
            program: invocation.program().to_string_lossy().into_owned(),
            args: invocation
                .arguments()
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect(),
        };
        let rendered = call.rendered();
        let should_fail = self
            .fail_substrings
            .lock()
            .map(|fail| fail.iter().any(|fragment| rendered.contains(fragment)))
            .unwrap_or(false);
        if should_fail {
            return Err(ProcessError::Spawn {
                program: invocation.program().clone(),
                source: io::Error::other("injected launch failure"),
            });
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        Ok(rendered)
    }
}

impl Launcher for RecordingLauncher {
    fn spawn(&self, invocation: &Invocation) -> Result<u32, ProcessError> {
        self.submit(CallMode::Spawn, invocation)?;
        Ok(self.next_pid.fetch_add(1, Ordering::SeqCst))
    }

    fn run(&self, invocation: &Invocation) -> Result<(), ProcessError> {
        self.submit(CallMode::Run, invocation).map(|_| ())
    }

    fn capture(&self, invocation: &Invocation) -> Result<String, ProcessError> {
        let rendered = self.submit(CallMode::Capture, invocation)?;
        Ok(self
            .outputs
            .lock()
            .ok()
            .and_then(|outputs| {
                outputs
                    .iter()
                    .find(|(fragment, _)| rendered.contains(fragment.as_str()))
                    .map(|(_, output)| output.clone())
            })
            .unwrap_or_default())
    }

    fn terminate(&self, pid: u32) -> Result<(), ProcessError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                mode: CallMode::Terminate,
                program: "terminate".to_owned(),
                args: vec![pid.to_string()],
            });
        }
        Ok(())
    }
}
