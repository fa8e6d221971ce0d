//! Typed configuration for the Switchyard emulation orchestrator.
//!
//! The DSL front-end that parses a topology description is a separate
//! component; it hands this crate's *stanza* records to the topology
//! registry. Everything here is plain data:
//!
//! - [`HostStanza`], [`SwitchStanza`], [`AppStanza`], [`LinkStanza`],
//!   [`SwitchManagerStanza`], and [`PacketinFilterStanza`] describe declared
//!   entities with named, validated fields plus an `extras` escape hatch for
//!   kind-specific settings.
//! - [`EventRule`] binds the three control-plane event categories to the
//!   controller application(s) that should receive them.
//! - [`RuntimePaths`] derives the per-session directories holding pid
//!   records, log artefacts, and control sockets.
//! - [`Executable`] resolves collaborator daemon binaries, honouring
//!   `SWITCHYARD_*_BIN` environment overrides.
//! - [`LogConfig`] carries the telemetry filter and output format.

mod executables;
mod logging;
mod rule;
mod runtime;
mod stanza;

pub use executables::Executable;
pub use logging::{LogConfig, LogFormat};
pub use rule::{EventRule, EventTarget};
pub use runtime::{RuntimePaths, RuntimePathsError};
pub use stanza::{
    AppStanza, HostStanza, LinkStanza, PacketinFilterStanza, SwitchManagerStanza, SwitchStanza,
};

/// Default TCP port the local control plane listens on.
pub const DEFAULT_CONTROL_PORT: u16 = 6633;
