use thiserror::Error;

use crate::chat::Identity;

/// Errors from a Directory backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// The identity is already assigned to a node.
    #[error("identity '{0}' is already assigned")]
    Conflict(Identity),

    #[error("directory backend error: {0}")]
    Backend(String),
}

/// Errors while forwarding a message to a peer node.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForwardError {
    #[error("forward transport error: {0}")]
    Transport(String),

    /// The peer answered with a status other than success or not-found.
    #[error("peer node answered with status {0}")]
    Status(u16),

    #[error("failed to encode message: {0}")]
    Encode(String),
}

/// Errors surfaced by the Router to its callers.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// No session for the recipient, locally or anywhere in the cluster.
    #[error("user \"{0}\": not found")]
    RecipientNotFound(Identity),

    #[error(transparent)]
    Forward(#[from] ForwardError),

    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Every generated identity collided with an existing assignment.
    #[error("no free identity after {0} attempts")]
    IdentityExhausted(u32),
}

/// Failure of an event source other than end-of-stream.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),
}
