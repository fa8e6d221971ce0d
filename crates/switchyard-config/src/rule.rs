//! Event-routing rule binding control-plane events to controller apps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Destination for one category of control-plane events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventTarget {
    /// Route to the built-in default handler.
    Default,
    /// Route to the named controller application.
    App(String),
}

impl EventTarget {
    /// Renders the target the way daemon command lines expect it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::App(name) => name.as_str(),
        }
    }
}

impl From<String> for EventTarget {
    fn from(value: String) -> Self {
        if value == "default" {
            Self::Default
        } else {
            Self::App(value)
        }
    }
}

impl From<EventTarget> for String {
    fn from(target: EventTarget) -> Self {
        match target {
            EventTarget::Default => "default".to_owned(),
            EventTarget::App(name) => name,
        }
    }
}

impl fmt::Display for EventTarget {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl Default for EventTarget {
    fn default() -> Self {
        Self::Default
    }
}

/// Binding of the three control-plane event categories to their receivers.
///
/// The default rule routes everything to the built-in handlers; a *unicast*
/// rule routes everything to a single named application.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventRule {
    /// Receiver for port status change events.
    #[serde(default)]
    pub port_status: EventTarget,
    /// Receiver for packet-in events.
    #[serde(default)]
    pub packet_in: EventTarget,
    /// Receiver for switch state notifications.
    #[serde(default)]
    pub state_notify: EventTarget,
}

impl EventRule {
    /// Builds a rule routing every category to the named application.
    #[must_use]
    pub fn unicast(app_name: impl Into<String>) -> Self {
        let name = app_name.into();
        Self {
            port_status: EventTarget::App(name.clone()),
            packet_in: EventTarget::App(name.clone()),
            state_notify: EventTarget::App(name),
        }
    }

    /// Renders the positional rule arguments for the event router daemon.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        vec![
            format!("port_status::{}", self.port_status),
            format!("packet_in::{}", self.packet_in),
            format!("state_notify::{}", self.state_notify),
        ]
    }
}
