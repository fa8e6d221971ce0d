//! Virtual cable between two entities, backed by a veth pair.

use tracing::{debug, info};

use switchyard_config::{Executable, LinkStanza};
use switchyard_process::{Invocation, Launcher};

use crate::TOPOLOGY_TARGET;
use crate::entity::{Entity, EntityKind};
use crate::errors::EntityError;

/// A virtual cable: one veth pair whose ends get wired to the peers named in
/// the declaration.
#[derive(Debug, Clone)]
pub struct Link {
    name: String,
    peers: (String, String),
    interfaces: (String, String),
}

impl Link {
    /// Wraps a declared link. `index` is the link's position in declaration
    /// order and keys the veth device names.
    #[must_use]
    pub fn new(stanza: LinkStanza, index: usize) -> Self {
        let name = format!("{}:{}", stanza.peers.0, stanza.peers.1);
        Self {
            name,
            peers: stanza.peers,
            interfaces: (format!("syd{index}-0"), format!("syd{index}-1")),
        }
    }

    /// Endpoint names the cable connects, in declaration order.
    #[must_use]
    pub fn peers(&self) -> (&str, &str) {
        (&self.peers.0, &self.peers.1)
    }

    /// Veth device names, one per endpoint in declaration order.
    #[must_use]
    pub fn interfaces(&self) -> (&str, &str) {
        (&self.interfaces.0, &self.interfaces.1)
    }

    /// Veth device wired to the named peer, if this link connects it.
    #[must_use]
    pub fn interface_for(&self, peer: &str) -> Option<&str> {
        if self.peers.0 == peer {
            Some(&self.interfaces.0)
        } else if self.peers.1 == peer {
            Some(&self.interfaces.1)
        } else {
            None
        }
    }

    fn ip(arguments: &[&str]) -> Invocation {
        Invocation::new(Executable::Ip.resolve()).args(arguments.iter().map(ToString::to_string))
    }

    /// Creates the veth pair and brings both ends up.
    pub fn up(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        let (first, second) = (&self.interfaces.0, &self.interfaces.1);
        let commands = [
            vec!["link", "add", "name", first, "type", "veth", "peer", "name", second],
            vec!["link", "set", first, "up"],
            vec!["link", "set", second, "up"],
        ];
        for arguments in &commands {
            launcher
                .run(&Self::ip(arguments))
                .map_err(|source| EntityError::process(EntityKind::Link, &self.name, source))?;
        }
        info!(
            target: TOPOLOGY_TARGET,
            link = self.name.as_str(),
            devices = format!("{first}/{second}"),
            "link up"
        );
        Ok(())
    }

    /// Deletes the veth pair. A failure is tolerated so a session start can
    /// clear devices left over from a crashed predecessor.
    pub fn down(&self, launcher: &dyn Launcher) {
        let invocation = Self::ip(&["link", "delete", &self.interfaces.0]);
        if let Err(error) = launcher.run(&invocation) {
            debug!(
                target: TOPOLOGY_TARGET,
                link = self.name.as_str(),
                %error,
                "link delete failed; device likely absent"
            );
        }
    }
}

impl Entity for Link {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Link
    }

    fn daemonize(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        self.up(launcher)
    }

    fn shutdown(&self, launcher: &dyn Launcher) -> Result<(), EntityError> {
        self.down(launcher);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use switchyard_process::recording::RecordingLauncher;

    use super::*;

    fn link(index: usize) -> Link {
        Link::new(
            LinkStanza {
                peers: ("switch1".to_owned(), "host1".to_owned()),
            },
            index,
        )
    }

    #[test]
    fn device_names_are_keyed_by_declaration_index() {
        let subject = link(2);
        assert_eq!(subject.interfaces(), ("syd2-0", "syd2-1"));
        assert_eq!(subject.name(), "switch1:host1");
    }

    #[test]
    fn each_peer_gets_its_own_end() {
        let subject = link(0);
        assert_eq!(subject.interface_for("switch1"), Some("syd0-0"));
        assert_eq!(subject.interface_for("host1"), Some("syd0-1"));
        assert_eq!(subject.interface_for("host2"), None);
    }

    #[test]
    fn up_creates_the_pair_then_raises_both_ends() {
        let launcher = RecordingLauncher::new();
        link(0).up(&launcher).unwrap();

        let rendered: Vec<String> = launcher.rendered();
        assert_eq!(
            rendered,
            vec![
                "ip link add name syd0-0 type veth peer name syd0-1".to_owned(),
                "ip link set syd0-0 up".to_owned(),
                "ip link set syd0-1 up".to_owned(),
            ]
        );
    }

    #[test]
    fn down_tolerates_a_missing_device() {
        let launcher = RecordingLauncher::new();
        launcher.fail_matching("link delete");
        let subject = link(0);
        subject.shutdown(&launcher).unwrap();
    }
}
