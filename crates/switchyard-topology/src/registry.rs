//! The per-session registry of declared entities.

use std::collections::HashMap;

use switchyard_config::{
    AppStanza, DEFAULT_CONTROL_PORT, HostStanza, LinkStanza, PacketinFilterStanza, RuntimePaths,
    SwitchManagerStanza, SwitchStanza,
};

use crate::app::App;
use crate::entity::EntityKind;
use crate::errors::RegistryError;
use crate::host::Host;
use crate::link::Link;
use crate::packetin_filter::PacketinFilter;
use crate::switch::Switch;
use crate::switch_manager::SwitchManager;
use crate::tracer::Tracer;

/// An insertion-ordered, name-unique collection of one entity kind.
///
/// Iteration always follows declaration order; lookup by name is constant
/// time via a side index.
#[derive(Debug, Clone)]
pub struct Roster<T> {
    kind: EntityKind,
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Roster<T> {
    /// Builds an empty roster for the given kind.
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Adds an entity under `name`.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateName`] when the name is taken.
    pub fn add(&mut self, name: impl Into<String>, item: T) -> Result<(), RegistryError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateName {
                kind: self.kind,
                name,
            });
        }
        self.index.insert(name, self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// Looks up an entity by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&T> {
        self.index.get(name).and_then(|&at| self.items.get(at))
    }

    /// Looks up an entity by name, mutably.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut T> {
        self.index.get(name).and_then(|&at| self.items.get_mut(at))
    }

    /// Entities in declaration order.
    pub fn values(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Entities in declaration order, mutably.
    pub fn values_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Number of entities in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes every entity.
    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }
}

/// The registry of every entity one orchestration session will drive.
///
/// Owned by the session that builds it; two topologies never share state.
#[derive(Debug, Clone)]
pub struct Topology {
    port: u16,
    paths: RuntimePaths,
    tracer: Option<Tracer>,
    switch_manager: Option<SwitchManager>,
    packetin_filter: Option<PacketinFilter>,
    hosts: Roster<Host>,
    switches: Roster<Switch>,
    links: Vec<Link>,
    apps: Roster<App>,
}

impl Topology {
    /// Builds an empty topology whose runtime artefacts live under `paths`.
    #[must_use]
    pub fn new(paths: RuntimePaths) -> Self {
        Self {
            port: DEFAULT_CONTROL_PORT,
            paths,
            tracer: None,
            switch_manager: None,
            packetin_filter: None,
            hosts: Roster::new(EntityKind::Host),
            switches: Roster::new(EntityKind::Switch),
            links: Vec::new(),
            apps: Roster::new(EntityKind::App),
        }
    }

    /// Runtime filesystem layout shared by every entity in the session.
    #[must_use]
    pub fn paths(&self) -> &RuntimePaths {
        &self.paths
    }

    /// Overrides the control-plane port switches dial back to.
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Control-plane port switches dial back to.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Declares a virtual host.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateName`] when a host of the same name
    /// already exists.
    pub fn add_host(&mut self, stanza: HostStanza) -> Result<(), RegistryError> {
        let name = stanza.name.clone();
        self.hosts.add(name, Host::new(stanza, self.paths.clone()))
    }

    /// Declares a virtual switch.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateName`] when a switch of the same
    /// name already exists.
    pub fn add_switch(&mut self, stanza: SwitchStanza) -> Result<(), RegistryError> {
        let name = stanza.name.clone();
        self.switches
            .add(name, Switch::new(stanza, self.port, self.paths.clone()))
    }

    /// Declares a virtual cable. Links are anonymous so duplicates are
    /// permitted; each gets device names keyed by declaration order.
    pub fn add_link(&mut self, stanza: LinkStanza) {
        let link = Link::new(stanza, self.links.len());
        for (peer, device) in [
            (link.peers().0.to_owned(), link.interfaces().0.to_owned()),
            (link.peers().1.to_owned(), link.interfaces().1.to_owned()),
        ] {
            if let Some(host) = self.hosts.find_mut(&peer) {
                host.set_interface(device);
            } else if let Some(switch) = self.switches.find_mut(&peer) {
                switch.add_interface(device);
            }
        }
        self.links.push(link);
    }

    /// Declares a controller application.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateName`] when an app of the same name
    /// already exists.
    pub fn add_app(&mut self, stanza: AppStanza) -> Result<(), RegistryError> {
        let name = stanza.name.clone();
        self.apps.add(name, App::new(stanza, self.paths.clone()))
    }

    /// Declares an explicit event-routing rule, overriding derivation.
    pub fn set_switch_manager(&mut self, stanza: SwitchManagerStanza) {
        self.switch_manager = Some(SwitchManager::from_stanza(
            stanza,
            self.port,
            self.paths.clone(),
        ));
    }

    /// Declares a packet-in filter.
    pub fn set_packetin_filter(&mut self, stanza: PacketinFilterStanza) {
        self.packetin_filter = Some(PacketinFilter::new(stanza, self.paths.clone()));
    }

    /// Enables the packet-trace sidecar for this session.
    pub fn enable_tracer(&mut self) {
        self.tracer = Some(Tracer::new(self.paths.clone()));
    }

    /// Looks up a host by name.
    #[must_use]
    pub fn find_host(&self, name: &str) -> Option<&Host> {
        self.hosts.find(name)
    }

    /// Looks up a switch by name.
    #[must_use]
    pub fn find_switch(&self, name: &str) -> Option<&Switch> {
        self.switches.find(name)
    }

    /// Looks up an app by name.
    #[must_use]
    pub fn find_app(&self, name: &str) -> Option<&App> {
        self.apps.find(name)
    }

    /// Hosts in declaration order.
    #[must_use]
    pub fn hosts(&self) -> &Roster<Host> {
        &self.hosts
    }

    /// Switches in declaration order.
    #[must_use]
    pub fn switches(&self) -> &Roster<Switch> {
        &self.switches
    }

    /// Links in declaration order.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Apps in declaration order.
    #[must_use]
    pub fn apps(&self) -> &Roster<App> {
        &self.apps
    }

    /// Number of declared apps.
    #[must_use]
    pub fn app_count(&self) -> usize {
        self.apps.len()
    }

    /// Explicit event router declaration, when one was made.
    #[must_use]
    pub fn switch_manager(&self) -> Option<&SwitchManager> {
        self.switch_manager.as_ref()
    }

    /// Declared packet-in filter, when one was made.
    #[must_use]
    pub fn packetin_filter(&self) -> Option<&PacketinFilter> {
        self.packetin_filter.as_ref()
    }

    /// Trace sidecar, when enabled.
    #[must_use]
    pub fn tracer(&self) -> Option<&Tracer> {
        self.tracer.as_ref()
    }

    /// Empties every collection, returning the topology to its just-built
    /// state. Each session starts from a cleared registry.
    pub fn clear(&mut self) {
        self.tracer = None;
        self.switch_manager = None;
        self.packetin_filter = None;
        self.hosts.clear();
        self.switches.clear();
        self.links.clear();
        self.apps.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::rstest;

    use crate::entity::Entity;

    use super::*;

    fn topology() -> Topology {
        Topology::new(RuntimePaths::new("/tmp/switchyard-registry-test"))
    }

    fn host_stanza(name: &str) -> HostStanza {
        HostStanza {
            name: name.to_owned(),
            ip: "192.168.0.1".to_owned(),
            netmask: "255.255.255.255".to_owned(),
            mac: "00:00:00:00:00:01".to_owned(),
            promisc: false,
            extras: BTreeMap::new(),
        }
    }

    fn switch_stanza(name: &str) -> SwitchStanza {
        SwitchStanza {
            name: name.to_owned(),
            ip: "127.0.0.1".to_owned(),
            dpid: "0000000000000001".to_owned(),
            extras: BTreeMap::new(),
        }
    }

    #[test]
    fn lookup_finds_entities_by_name() {
        let mut subject = topology();
        subject.add_host(host_stanza("host1")).unwrap();
        subject.add_switch(switch_stanza("switch1")).unwrap();

        assert!(subject.find_host("host1").is_some());
        assert!(subject.find_switch("switch1").is_some());
        assert!(subject.find_host("absent").is_none());
    }

    #[rstest]
    #[case::host(true)]
    #[case::switch(false)]
    fn duplicate_names_are_rejected_within_a_kind(#[case] host: bool) {
        let mut subject = topology();
        let error = if host {
            subject.add_host(host_stanza("dup")).unwrap();
            subject.add_host(host_stanza("dup")).unwrap_err()
        } else {
            subject.add_switch(switch_stanza("dup")).unwrap();
            subject.add_switch(switch_stanza("dup")).unwrap_err()
        };
        assert!(matches!(error, RegistryError::DuplicateName { name, .. } if name == "dup"));
    }

    #[test]
    fn the_same_name_may_appear_under_different_kinds() {
        let mut subject = topology();
        subject.add_host(host_stanza("node")).unwrap();
        subject.add_switch(switch_stanza("node")).unwrap();
        assert!(subject.find_host("node").is_some());
        assert!(subject.find_switch("node").is_some());
    }

    #[test]
    fn iteration_follows_declaration_order() {
        let mut subject = topology();
        for name in ["zeta", "alpha", "mid"] {
            subject.add_host(host_stanza(name)).unwrap();
        }
        let names: Vec<&str> = subject.hosts().values().map(|host| host.name()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn links_wire_interfaces_to_their_peers() {
        let mut subject = topology();
        subject.add_host(host_stanza("host1")).unwrap();
        subject.add_switch(switch_stanza("switch1")).unwrap();
        subject.add_link(LinkStanza {
            peers: ("switch1".to_owned(), "host1".to_owned()),
        });

        let switch = subject.find_switch("switch1").unwrap();
        assert_eq!(switch.interfaces(), ["syd0-0".to_owned()]);
        let host = subject.find_host("host1").unwrap();
        assert_eq!(host.interface(), "syd0-1");
    }

    #[test]
    fn clear_resets_every_collection() {
        let mut subject = topology();
        subject.add_host(host_stanza("host1")).unwrap();
        subject.add_switch(switch_stanza("switch1")).unwrap();
        subject.add_link(LinkStanza {
            peers: ("switch1".to_owned(), "host1".to_owned()),
        });
        subject.enable_tracer();
        subject.clear();

        assert!(subject.hosts().is_empty());
        assert!(subject.switches().is_empty());
        assert!(subject.links().is_empty());
        assert!(subject.apps().is_empty());
        assert!(subject.tracer().is_none());

        // A reused registry accepts the old names again.
        subject.add_host(host_stanza("host1")).unwrap();
    }
}
