//! Node-local chat router.
//!
//! The `Router` owns every session hosted on this node and decides, per
//! message, between local delivery (enqueue into the recipient's mailbox) and
//! cross-node forwarding (Directory lookup, then a deliver-inbound call to the
//! hosting node).
//!
//! The identity -> mailbox table sits behind one mutex that is only held for
//! lookup/insert/remove. Queue operations, Directory calls and forwarding all
//! happen with the lock released.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use parley_types::chat::{ChatMessage, Identity, NodeAddress};
use parley_types::error::{DirectoryError, RouterError};
use tracing::{debug, info, warn};

use super::forward::{ForwardOutcome, Forwarder};
use super::mailbox::Mailbox;
use super::nickname;
use super::session::Session;
use crate::directory::Directory;

/// Default number of identities tried before `IdentityExhausted`.
pub const DEFAULT_IDENTITY_ATTEMPTS: u32 = 5;

type NameGenerator = Box<dyn Fn() -> Identity + Send + Sync>;

enum LocalDelivery {
    Delivered,
    NotLocal(ChatMessage),
}

/// Per-node session registry and message router.
pub struct Router<D, F> {
    directory: D,
    forwarder: F,
    address: NodeAddress,
    sessions: Mutex<HashMap<Identity, Arc<Mailbox>>>,
    identity_attempts: u32,
    names: NameGenerator,
}

impl<D: Directory, F: Forwarder> Router<D, F> {
    /// Create a router for the node reachable at `address`.
    pub fn new(directory: D, forwarder: F, address: NodeAddress) -> Self {
        Self {
            directory,
            forwarder,
            address,
            sessions: Mutex::new(HashMap::new()),
            identity_attempts: DEFAULT_IDENTITY_ATTEMPTS,
            names: Box::new(nickname::generate),
        }
    }

    /// Override how many identities are tried on Directory conflicts.
    pub fn with_identity_attempts(mut self, attempts: u32) -> Self {
        self.identity_attempts = attempts.max(1);
        self
    }

    /// Replace the identity generator.
    pub fn with_name_generator(
        mut self,
        names: impl Fn() -> Identity + Send + Sync + 'static,
    ) -> Self {
        self.names = Box::new(names);
        self
    }

    /// Address this node registers in the Directory.
    pub fn address(&self) -> &NodeAddress {
        &self.address
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Open a session for a newly connected client.
    ///
    /// Registers a fresh identity in the Directory, creates the local
    /// mailbox and enqueues the greeting from `SYSTEM`.
    pub async fn create_session(self: &Arc<Self>) -> Result<Session<D, F>, RouterError> {
        let identity = self.assign_fresh_identity().await?;
        self.lock_sessions()
            .insert(identity.clone(), Arc::new(Mailbox::new()));

        let greeting = ChatMessage::system(identity.clone(), format!("Greetings, {identity}."));
        match self.deliver_local(greeting).await {
            Ok(LocalDelivery::Delivered) => {}
            Ok(LocalDelivery::NotLocal(_)) => {
                return Err(RouterError::Delivery(format!(
                    "session {identity} vanished before greeting"
                )));
            }
            Err(err) => {
                if let Err(close_err) = self.close_session(&identity).await {
                    warn!(%identity, error = %close_err, "failed to roll back session");
                }
                return Err(err);
            }
        }

        info!(%identity, sessions = self.session_count(), "session opened");
        Ok(Session::new(identity, Arc::clone(self)))
    }

    /// Close the session for `identity` and release its Directory entry.
    ///
    /// Safe to call repeatedly: later calls find the session already gone and
    /// leave the Directory untouched.
    pub async fn close_session(&self, identity: &Identity) -> Result<(), RouterError> {
        let mailbox = self.lock_sessions().remove(identity);
        let Some(mailbox) = mailbox else {
            debug!(%identity, "session already closed");
            return Ok(());
        };
        mailbox.close();
        self.directory.unassign(identity).await?;
        info!(%identity, "session closed");
        Ok(())
    }

    /// Close every local session. Returns how many were closed.
    ///
    /// Directory failures are logged and do not stop the sweep.
    pub async fn close_all_sessions(&self) -> usize {
        let drained: Vec<(Identity, Arc<Mailbox>)> = self.lock_sessions().drain().collect();
        let count = drained.len();
        for (identity, mailbox) in drained {
            mailbox.close();
            if let Err(err) = self.directory.unassign(&identity).await {
                warn!(%identity, error = %err, "failed to unassign identity during shutdown");
            }
        }
        info!(count, "closed all sessions");
        count
    }

    /// Route a message to its recipient, locally or on a peer node.
    ///
    /// A full local mailbox makes this wait. An unknown recipient yields
    /// `RecipientNotFound` and a best-effort notice to the sender.
    pub async fn deliver(&self, message: ChatMessage) -> Result<(), RouterError> {
        let message = match self.deliver_local(message).await? {
            LocalDelivery::Delivered => return Ok(()),
            LocalDelivery::NotLocal(message) => message,
        };
        debug!(to = %message.to, "recipient not hosted locally, consulting directory");

        let node = match self.directory.lookup(&message.to).await? {
            Some(node) if node != self.address => node,
            Some(_) => {
                debug!(to = %message.to, "directory points at this node but no session exists");
                return Err(self.recipient_not_found(&message));
            }
            None => return Err(self.recipient_not_found(&message)),
        };

        debug!(to = %message.to, %node, "forwarding message");
        match self.forwarder.forward(&node, &message).await? {
            ForwardOutcome::Accepted => Ok(()),
            ForwardOutcome::RecipientNotFound => Err(self.recipient_not_found(&message)),
        }
    }

    /// Wait for the next message addressed to `identity`.
    ///
    /// Returns `None` (end-of-stream) once the session is closed or if it
    /// does not exist on this node.
    pub async fn receive_for(&self, identity: &Identity) -> Option<ChatMessage> {
        let mailbox = self.lock_sessions().get(identity).cloned();
        match mailbox {
            Some(mailbox) => mailbox.pop().await,
            None => None,
        }
    }

    /// Handle a message forwarded by a peer node: local delivery only.
    pub async fn inbound_forward(&self, message: ChatMessage) -> Result<(), RouterError> {
        match self.deliver_local(message).await? {
            LocalDelivery::Delivered => Ok(()),
            LocalDelivery::NotLocal(message) => Err(RouterError::RecipientNotFound(message.to)),
        }
    }

    /// Number of sessions currently hosted on this node.
    pub fn session_count(&self) -> usize {
        self.lock_sessions().len()
    }

    /// Close every session ahead of node shutdown.
    pub async fn shutdown(&self) -> usize {
        self.close_all_sessions().await
    }

    async fn assign_fresh_identity(&self) -> Result<Identity, RouterError> {
        for attempt in 1..=self.identity_attempts {
            let identity = (self.names)();
            if identity.is_system() {
                continue;
            }
            match self.directory.assign(&identity, &self.address).await {
                Ok(()) => return Ok(identity),
                Err(DirectoryError::Conflict(taken)) => {
                    debug!(%taken, attempt, "identity already assigned, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        }
        warn!(attempts = self.identity_attempts, "could not find a free identity");
        Err(RouterError::IdentityExhausted(self.identity_attempts))
    }

    async fn deliver_local(&self, message: ChatMessage) -> Result<LocalDelivery, RouterError> {
        let mailbox = self.lock_sessions().get(&message.to).cloned();
        match mailbox {
            Some(mailbox) => {
                mailbox.push(message).await?;
                Ok(LocalDelivery::Delivered)
            }
            None => Ok(LocalDelivery::NotLocal(message)),
        }
    }

    /// Build the `RecipientNotFound` error and notify the sender.
    ///
    /// The notice never waits on a full mailbox and its failure is only
    /// logged.
    fn recipient_not_found(&self, message: &ChatMessage) -> RouterError {
        let err = RouterError::RecipientNotFound(message.to.clone());
        if message.from.is_system() {
            return err;
        }
        let mailbox = self.lock_sessions().get(&message.from).cloned();
        match mailbox {
            Some(mailbox) => {
                let notice = ChatMessage::system(message.from.clone(), err.to_string());
                if let Err(notice_err) = mailbox.try_push(notice) {
                    warn!(to = %message.from, error = %notice_err, "failed to send not-found notice");
                }
            }
            None => debug!(from = %message.from, "sender not local, skipping not-found notice"),
        }
        err
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<Identity, Arc<Mailbox>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D, F> std::fmt::Debug for Router<D, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sessions = self
            .sessions
            .lock()
            .map(|s| s.len())
            .unwrap_or_else(|p| p.into_inner().len());
        f.debug_struct("Router")
            .field("address", &self.address)
            .field("sessions", &sessions)
            .field("identity_attempts", &self.identity_attempts)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
