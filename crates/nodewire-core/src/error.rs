//! Error types for wiring operations.

use thiserror::Error;

/// Wiring errors.
///
/// Every failure is local to the call that triggered it; nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WiringError {
    /// The connector has no explicit name and no bound endpoint with a name.
    #[error("Connector name cannot be resolved: no explicit name and no named endpoint")]
    NameUnresolved,
    #[error("Source endpoint not found: {0}")]
    UnresolvedSource(String),
    #[error("Destination endpoint not found: {0}")]
    UnresolvedDestination(String),
    #[error("Connector {connector} references unknown peer: {peer}")]
    UnresolvedPeer { connector: String, peer: String },
    #[error("Unknown connector: {0}")]
    UnknownConnector(String),
    #[error("Duplicate connector name: {0}")]
    DuplicateName(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for wiring operations.
pub type WiringResult<T> = Result<T, WiringError>;
