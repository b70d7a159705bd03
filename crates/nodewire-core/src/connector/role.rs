//! Connector role derived from its endpoint bindings.

use serde::{Deserialize, Serialize};

/// What a connector can currently do, given which endpoints are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorRole {
    /// No endpoint bound.
    #[default]
    Unbound,
    /// Reads from a source endpoint.
    Source,
    /// Writes into a destination endpoint.
    Destination,
    /// Both endpoints bound.
    Both,
}

impl ConnectorRole {
    /// Derive the role from the two bindings.
    pub fn from_bindings(has_source: bool, has_destination: bool) -> Self {
        match (has_source, has_destination) {
            (false, false) => Self::Unbound,
            (true, false) => Self::Source,
            (false, true) => Self::Destination,
            (true, true) => Self::Both,
        }
    }

    pub fn has_source(self) -> bool {
        matches!(self, Self::Source | Self::Both)
    }

    pub fn has_destination(self) -> bool {
        matches!(self, Self::Destination | Self::Both)
    }
}
