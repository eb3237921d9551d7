//! Client-facing handle on one routed session.
//!
//! A `Session` is a thin view over the Router: it carries the identity and
//! a shared reference to the Router that owns the mailbox. Cloning it does
//! not create a new session.

use std::sync::Arc;

use parley_types::chat::{ChatMessage, Identity};
use parley_types::error::{RouterError, SourceError};

use super::forward::Forwarder;
use super::router::Router;
use crate::directory::Directory;
use crate::event::{Event, EventSource};

pub struct Session<D, F> {
    identity: Identity,
    router: Arc<Router<D, F>>,
}

impl<D: Directory, F: Forwarder> Session<D, F> {
    pub(crate) fn new(identity: Identity, router: Arc<Router<D, F>>) -> Self {
        Self { identity, router }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Send `body` to `to` from this session's identity.
    pub async fn send(&self, to: Identity, body: impl Into<String>) -> Result<(), RouterError> {
        let message = ChatMessage::new(self.identity.clone(), to, body);
        self.router.deliver(message).await
    }

    /// Next inbound message, or `None` once the session is closed.
    pub async fn receive(&self) -> Option<ChatMessage> {
        self.router.receive_for(&self.identity).await
    }

    pub async fn close(&self) -> Result<(), RouterError> {
        self.router.close_session(&self.identity).await
    }
}

impl<D, F> Clone for Session<D, F> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            router: Arc::clone(&self.router),
        }
    }
}

impl<D, F> std::fmt::Debug for Session<D, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// A session is itself an event source: each inbound message becomes a
/// `UserReceivesMessage` event, and closing the session ends the stream.
impl<D: Directory, F: Forwarder> EventSource for Session<D, F> {
    async fn next_event(&mut self) -> Result<Option<Event>, SourceError> {
        Ok(self.receive().await.map(Event::UserReceivesMessage))
    }
}
