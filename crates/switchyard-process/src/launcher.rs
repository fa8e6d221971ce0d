//! The seam between lifecycle logic and actual OS process invocation.

use std::ffi::OsString;
use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tracing::debug;

use crate::PROCESS_TARGET;
use crate::errors::ProcessError;

#[cfg(unix)]
use std::os::unix::process::CommandExt;

/// One fully described process invocation.
///
/// Entity wrappers build these; the driver never inspects them. When a log
/// artefact is configured the child's stdout and stderr are appended to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    log: Option<PathBuf>,
}

impl Invocation {
    /// Starts describing an invocation of the given binary.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            log: None,
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends every argument in order.
    #[must_use]
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Redirects the child's output streams to the log artefact, appending.
    #[must_use]
    pub fn log_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.log = Some(path.into());
        self
    }

    /// Binary being invoked.
    #[must_use]
    pub fn program(&self) -> &OsString {
        &self.program
    }

    /// Arguments in order.
    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Configured log artefact, if any.
    #[must_use]
    pub fn log(&self) -> Option<&Path> {
        self.log.as_deref()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(formatter, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Abstraction over process execution strategies.
pub trait Launcher: Send + Sync {
    /// Starts the invocation detached in its own process group and returns
    /// the child pid as soon as it is known. Never waits for readiness.
    ///
    /// # Errors
    /// Returns [`ProcessError`] when the child cannot be spawned or its log
    /// artefact cannot be opened.
    fn spawn(&self, invocation: &Invocation) -> Result<u32, ProcessError>;

    /// Runs the invocation in the foreground, blocking until it exits.
    ///
    /// # Errors
    /// Returns [`ProcessError`] when the child cannot be spawned, cannot be
    /// waited on, or exits unsuccessfully.
    fn run(&self, invocation: &Invocation) -> Result<(), ProcessError>;

    /// Runs the invocation to completion and returns its standard output.
    ///
    /// Used for query-style CLI verbs whose answer arrives on stdout rather
    /// than in a log artefact.
    ///
    /// # Errors
    /// Returns [`ProcessError`] when the child cannot be spawned, cannot be
    /// waited on, or exits unsuccessfully.
    fn capture(&self, invocation: &Invocation) -> Result<String, ProcessError>;

    /// Asks the process to terminate. A pid that already exited is treated
    /// as success.
    ///
    /// # Errors
    /// Returns [`ProcessError::Signal`] when the signal fails for a reason
    /// other than the process having exited.
    fn terminate(&self, pid: u32) -> Result<(), ProcessError>;
}

/// Launcher backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl SystemLauncher {
    /// Builds the production launcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn command(invocation: &Invocation, foreground: bool) -> Result<Command, ProcessError> {
        let mut command = Command::new(invocation.program());
        command.args(invocation.arguments());
        command.stdin(Stdio::null());
        match invocation.log() {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| ProcessError::LogOpen {
                        path: path.to_path_buf(),
                        source,
                    })?;
                let stderr = file.try_clone().map_err(|source| ProcessError::LogOpen {
                    path: path.to_path_buf(),
                    source,
                })?;
                command.stdout(Stdio::from(file));
                command.stderr(Stdio::from(stderr));
            }
            None if foreground => {
                // The foreground child owns the terminal until it exits.
                command.stdout(Stdio::inherit());
                command.stderr(Stdio::inherit());
            }
            None => {
                command.stdout(Stdio::null());
                command.stderr(Stdio::null());
            }
        }
        Ok(command)
    }
}

impl Launcher for SystemLauncher {
    fn spawn(&self, invocation: &Invocation) -> Result<u32, ProcessError> {
        let mut command = Self::command(invocation, false)?;
        #[cfg(unix)]
        command.process_group(0);
        let child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: invocation.program().clone(),
            source,
        })?;
        let pid = child.id();
        debug!(
            target: PROCESS_TARGET,
            pid,
            command = %invocation,
            "spawned detached child"
        );
        Ok(pid)
    }

    fn run(&self, invocation: &Invocation) -> Result<(), ProcessError> {
        let mut command = Self::command(invocation, true)?;
        debug!(
            target: PROCESS_TARGET,
            command = %invocation,
            "running foreground child"
        );
        let status = command.status().map_err(|source| ProcessError::Wait {
            program: invocation.program().clone(),
            source,
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(ProcessError::Exit {
                program: invocation.program().clone(),
                code: status.code(),
            })
        }
    }

    fn capture(&self, invocation: &Invocation) -> Result<String, ProcessError> {
        let mut command = Command::new(invocation.program());
        command.args(invocation.arguments());
        command.stdin(Stdio::null());
        debug!(
            target: PROCESS_TARGET,
            command = %invocation,
            "capturing child output"
        );
        let output = command.output().map_err(|source| ProcessError::Wait {
            program: invocation.program().clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(ProcessError::Exit {
                program: invocation.program().clone(),
                code: output.status.code(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn terminate(&self, pid: u32) -> Result<(), ProcessError> {
        #[expect(
            clippy::cast_possible_wrap,
            reason = "pids fit in i32 on every supported platform"
        )]
        match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) => {
                debug!(target: PROCESS_TARGET, pid, "terminated child");
                Ok(())
            }
            Err(Errno::ESRCH) => {
                debug!(target: PROCESS_TARGET, pid, "child already exited");
                Ok(())
            }
            Err(source) => Err(ProcessError::Signal { pid, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests use expect for clarity")]

    use super::*;

    #[test]
    fn run_reports_success_for_a_clean_exit() {
        let launcher = SystemLauncher::new();
        launcher
            .run(&Invocation::new("true"))
            .expect("'true' should exit cleanly");
    }

    #[test]
    fn run_surfaces_the_exit_code_of_a_failing_child() {
        let launcher = SystemLauncher::new();
        let error = launcher
            .run(&Invocation::new("false"))
            .expect_err("'false' should exit unsuccessfully");
        match error {
            ProcessError::Exit { code, .. } => assert_eq!(code, Some(1)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn run_surfaces_spawn_failures_for_missing_binaries() {
        let launcher = SystemLauncher::new();
        let error = launcher
            .run(&Invocation::new("switchyard-no-such-binary"))
            .expect_err("missing binary should fail");
        assert!(matches!(error, ProcessError::Wait { .. } | ProcessError::Spawn { .. }));
    }

    #[test]
    fn spawn_returns_the_child_pid_immediately() {
        let launcher = SystemLauncher::new();
        let pid = launcher
            .spawn(&Invocation::new("true"))
            .expect("'true' should spawn");
        assert!(pid > 0);
    }

    #[test]
    fn capture_returns_the_child_stdout() {
        let launcher = SystemLauncher::new();
        let output = launcher
            .capture(&Invocation::new("echo").arg("stats"))
            .expect("'echo' should exit cleanly");
        assert_eq!(output, "stats\n");
    }

    #[test]
    fn capture_surfaces_a_failing_exit() {
        let launcher = SystemLauncher::new();
        let error = launcher
            .capture(&Invocation::new("false"))
            .expect_err("'false' should exit unsuccessfully");
        assert!(matches!(error, ProcessError::Exit { .. }));
    }

    #[test]
    fn terminate_tolerates_an_already_exited_pid() {
        let launcher = SystemLauncher::new();
        // Spawn a short-lived child and reap it so the pid is known dead.
        let mut child = Command::new("true").spawn().expect("spawn 'true'");
        child.wait().expect("reap child");
        launcher
            .terminate(child.id())
            .expect("terminate must tolerate dead pid");
    }

    #[test]
    fn invocation_renders_program_and_arguments() {
        let invocation = Invocation::new("ip")
            .args(["link", "add"])
            .arg("name")
            .arg("syd0-0");
        assert_eq!(invocation.to_string(), "ip link add name syd0-0");
    }
}
