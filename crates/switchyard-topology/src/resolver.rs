//! Derives the effective event-routing rule from a topology.

use switchyard_config::EventRule;

use crate::entity::Entity;
use crate::errors::ResolveError;
use crate::registry::Topology;

/// Derives the event-routing rule the session's event router will enforce.
///
/// An explicit declaration always wins. Otherwise the rule follows the app
/// count: no apps route everything to the built-in default handlers, a
/// single app receives everything, and two or more apps are ambiguous and
/// must be routed explicitly.
///
/// This is a pure query; materialising the router from the returned rule is
/// the driver's job.
///
/// # Errors
/// Returns [`ResolveError::AmbiguousRouting`] for two or more apps without
/// an explicit declaration.
pub fn resolve_rule(topology: &Topology) -> Result<EventRule, ResolveError> {
    if let Some(manager) = topology.switch_manager() {
        return Ok(manager.rule().clone());
    }
    let mut apps = topology.apps().values();
    match (apps.next(), apps.next()) {
        (None, _) => Ok(EventRule::default()),
        (Some(app), None) => Ok(EventRule::unicast(app.name())),
        (Some(_), Some(_)) => Err(ResolveError::AmbiguousRouting {
            apps: topology.app_count(),
        }),
    }
}
