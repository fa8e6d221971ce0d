//! Child-process plumbing for the Switchyard orchestrator.
//!
//! Every entity the orchestrator manages runs as an independently scheduled
//! OS process. This crate owns the narrow seams that make that manageable:
//!
//! - [`Invocation`] and the [`Launcher`] trait describe *how* to start a
//!   process without the driver knowing which binary is involved;
//!   [`SystemLauncher`] is the production implementation over
//!   `std::process::Command`.
//! - [`ProcessRecord`] persists a durable name→pid mapping so a later,
//!   separate orchestration invocation can still signal the right child.
//! - [`ReadinessProbe`] polls an append-only log artefact for a
//!   kind-specific marker with a bounded deadline.

mod errors;
mod files;
mod launcher;
mod readiness;
mod record;

pub use errors::ProcessError;
pub use launcher::{Invocation, Launcher, SystemLauncher};
pub use readiness::ReadinessProbe;
pub use record::ProcessRecord;

#[cfg(any(test, feature = "test-support"))]
pub mod recording;

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::launch");
