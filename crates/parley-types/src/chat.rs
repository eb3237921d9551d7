//! Chat domain types: identities, node addresses and the message envelope.
//!
//! A `ChatMessage` is an immutable value. It is produced by the sender's
//! handler and either enqueued into a local session's mailbox or serialized
//! over the cluster forwarding protocol.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity reserved for server-originated notices (greetings, "not found").
pub const SYSTEM_IDENTITY: &str = "SYSTEM";

/// Opaque name of a connected user, unique cluster-wide while its session lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The synthetic sender used for server notices.
    pub fn system() -> Self {
        Self(SYSTEM_IDENTITY.to_string())
    }

    pub fn is_system(&self) -> bool {
        self.0 == SYSTEM_IDENTITY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// `host:port` of a node's internal forwarding endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeAddress(String);

impl NodeAddress {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A one-to-one text message.
///
/// The wire form (forwarding protocol) names the text field `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub from: Identity,
    pub to: Identity,
    #[serde(rename = "message")]
    pub body: String,
}

impl ChatMessage {
    pub fn new(from: Identity, to: Identity, body: impl Into<String>) -> Self {
        Self {
            from,
            to,
            body: body.into(),
        }
    }

    /// Notice from `SYSTEM` to `to`.
    pub fn system(to: Identity, body: impl Into<String>) -> Self {
        Self::new(Identity::system(), to, body)
    }
}
