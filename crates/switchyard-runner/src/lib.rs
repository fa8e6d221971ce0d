//! The session driver for the Switchyard emulation orchestrator.
//!
//! A [`Runner`] takes a populated topology registry and drives every
//! declared entity through one session: phase-ordered bring-up, the
//! foreground app holding the session until it exits or an interrupt takes
//! it down, and best-effort teardown in reverse order as a separate
//! explicit pass.
//!
//! Process execution and interrupt observation are both behind trait seams
//! ([`switchyard_process::Launcher`] and [`InterruptSignal`]) so the whole
//! driver is testable without touching real daemons or signals.

mod errors;
mod interrupt;
mod runner;
mod teardown;
pub mod telemetry;

pub use errors::{Phase, RunnerError};
pub use interrupt::{InterruptError, InterruptSignal, SystemInterrupt};
pub use runner::{Runner, SessionOutcome};

pub(crate) const RUNNER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

#[cfg(test)]
mod tests;
