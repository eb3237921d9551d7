//! Forwarder trait for the cluster "deliver-inbound" protocol.
//!
//! When a recipient is not hosted locally, the Router resolves its node in
//! the Directory and hands the message to a `Forwarder`, which performs the
//! request against that node's inbound endpoint. The HTTP implementation
//! lives in parley-infra.

use std::future::Future;

use parley_types::chat::{ChatMessage, NodeAddress};
use parley_types::error::ForwardError;

/// Successful answers of a peer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// The peer enqueued the message for its local session.
    Accepted,
    /// The peer does not host the recipient (HTTP 404).
    RecipientNotFound,
}

/// Client side of the deliver-inbound operation.
pub trait Forwarder: Send + Sync {
    /// Deliver `message` to the session hosted on `node`.
    ///
    /// Transport failures and any answer other than accepted / not-found
    /// are `ForwardError`s.
    fn forward(
        &self,
        node: &NodeAddress,
        message: &ChatMessage,
    ) -> impl Future<Output = Result<ForwardOutcome, ForwardError>> + Send;
}
