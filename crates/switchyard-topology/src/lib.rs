//! In-memory topology registry and process-backed entity wrappers.
//!
//! A [`Topology`] is the per-session registry of declared network entities:
//! hosts, switches, links, controller apps, plus the optional explicit
//! switch manager, packet-in filter, and trace sidecar. It is an explicit
//! value owned by one orchestration session — never process-wide state — so
//! independent sessions and tests stay deterministic.
//!
//! [`resolve_rule`] derives the effective event-routing rule from the
//! registry; it is a pure query and never materialises a switch manager as a
//! side effect.
//!
//! Every entity kind implements the [`Entity`] lifecycle facade so the
//! driver in `switchyard-runner` can treat them polymorphically. The
//! wrappers own their invocation detail (binaries, flags, pid and log
//! paths); the driver only ever sees the facade.

mod app;
mod entity;
mod errors;
mod host;
mod link;
mod packetin_filter;
mod registry;
mod resolver;
mod switch;
mod switch_manager;
mod tracer;

pub use app::App;
pub use entity::{Entity, EntityKind};
pub use errors::{EntityError, RegistryError, ResolveError};
pub use host::{Host, TrafficStats};
pub use link::Link;
pub use packetin_filter::PacketinFilter;
pub use registry::{Roster, Topology};
pub use resolver::resolve_rule;
pub use switch::{SWITCH_READY_MARKER, Switch};
pub use switch_manager::{SWITCH_MANAGER_NAME, SwitchManager};
pub use tracer::Tracer;

pub(crate) const TOPOLOGY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");
