//! Declaration records handed over by the topology DSL front-end.
//!
//! Each record carries the named fields the orchestrator relies on; any
//! additional kind-specific settings travel in the `extras` map so front-ends
//! never need to smuggle configuration through dynamic attribute access.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rule::EventRule;

fn default_netmask() -> String {
    "255.255.255.255".to_owned()
}

/// A declared virtual host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStanza {
    /// Unique host name within the topology.
    pub name: String,
    /// IPv4 address assigned to the host interface.
    pub ip: String,
    /// Netmask applied to the host interface.
    #[serde(default = "default_netmask")]
    pub netmask: String,
    /// MAC address assigned to the host interface.
    pub mac: String,
    /// Whether the interface runs in promiscuous mode.
    #[serde(default)]
    pub promisc: bool,
    /// Kind-specific settings not modelled as named fields.
    #[serde(default)]
    pub extras: BTreeMap<String, String>,
}

/// A declared virtual OpenFlow switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchStanza {
    /// Unique switch name within the topology.
    pub name: String,
    /// IPv4 address the switch dials the control plane from.
    pub ip: String,
    /// Datapath identifier, sixteen hex digits.
    pub dpid: String,
    /// Kind-specific settings not modelled as named fields.
    #[serde(default)]
    pub extras: BTreeMap<String, String>,
}

/// A declared controller application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppStanza {
    /// Unique application name within the topology.
    pub name: String,
    /// Path of the application binary.
    pub command: String,
    /// Extra command-line options appended verbatim.
    #[serde(default)]
    pub options: Vec<String>,
    /// Kind-specific settings not modelled as named fields.
    #[serde(default)]
    pub extras: BTreeMap<String, String>,
}

/// A declared virtual cable between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStanza {
    /// Ordered endpoint pair; switch-to-host or switch-to-switch.
    pub peers: (String, String),
}

/// An explicit event-routing declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchManagerStanza {
    /// Routing rule applied verbatim, overriding derivation.
    pub rule: EventRule,
}

/// A declared packet-in filter sitting in front of the controller apps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketinFilterStanza {
    /// Unique filter name.
    pub name: String,
    /// Receiver for LLDP frames.
    pub lldp: String,
    /// Receiver for every other packet-in.
    pub packet_in: String,
}
