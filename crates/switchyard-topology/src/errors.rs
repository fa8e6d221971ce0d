//! Error types for registry population, rule resolution, and entity lifecycle.

use thiserror::Error;

use switchyard_process::ProcessError;

use crate::entity::EntityKind;

/// Errors raised while populating the topology registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// An entity with the same name already exists in the kind's collection.
    #[error("{kind} '{name}' is already declared")]
    DuplicateName {
        /// Kind of the colliding entity.
        kind: EntityKind,
        /// Name that collided.
        name: String,
    },
}

/// Errors raised while deriving the event-routing rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Two or more apps are declared and no explicit routing exists.
    #[error(
        "no event routing configured for {apps} apps; use the `event` directive to specify event routing"
    )]
    AmbiguousRouting {
        /// Number of apps competing for events.
        apps: usize,
    },
}

/// A lifecycle operation failed for one specific entity.
#[derive(Debug, Error)]
pub enum EntityError {
    /// The underlying process operation failed.
    #[error("{kind} '{name}': {source}")]
    Process {
        /// Kind of the entity that failed.
        kind: EntityKind,
        /// Name of the entity that failed.
        name: String,
        /// Underlying process error.
        #[source]
        source: ProcessError,
    },
    /// A statistics query answered with output that could not be parsed.
    #[error("{kind} '{name}' returned malformed statistics: {line:?}")]
    MalformedStats {
        /// Kind of the entity that was queried.
        kind: EntityKind,
        /// Name of the entity that was queried.
        name: String,
        /// The offending output line.
        line: String,
    },
}

impl EntityError {
    pub(crate) fn process(kind: EntityKind, name: impl Into<String>, source: ProcessError) -> Self {
        Self::Process {
            kind,
            name: name.into(),
            source,
        }
    }

    /// Kind of the entity the failure belongs to.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Process { kind, .. } | Self::MalformedStats { kind, .. } => *kind,
        }
    }

    /// Name of the entity the failure belongs to.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Process { name, .. } | Self::MalformedStats { name, .. } => name.as_str(),
        }
    }
}
