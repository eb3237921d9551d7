//! In-memory Directory and scripted Forwarder for router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use parley_types::chat::{ChatMessage, Identity, NodeAddress};
use parley_types::error::{DirectoryError, ForwardError};

use super::forward::{ForwardOutcome, Forwarder};
use crate::directory::Directory;

#[derive(Default)]
pub struct TestDirectory {
    entries: Mutex<HashMap<Identity, NodeAddress>>,
    failure: Mutex<Option<String>>,
    unassigns: AtomicUsize,
}

impl TestDirectory {
    pub fn insert(&self, identity: &Identity, node: NodeAddress) {
        self.entries.lock().unwrap().insert(identity.clone(), node);
    }

    pub fn get(&self, identity: &Identity) -> Option<NodeAddress> {
        self.entries.lock().unwrap().get(identity).cloned()
    }

    pub fn fail_with(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn unassign_calls(&self) -> usize {
        self.unassigns.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), DirectoryError> {
        match self.failure.lock().unwrap().clone() {
            Some(reason) => Err(DirectoryError::Backend(reason)),
            None => Ok(()),
        }
    }
}

impl Directory for TestDirectory {
    async fn assign(&self, identity: &Identity, node: &NodeAddress) -> Result<(), DirectoryError> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(identity) {
            return Err(DirectoryError::Conflict(identity.clone()));
        }
        entries.insert(identity.clone(), node.clone());
        Ok(())
    }

    async fn lookup(&self, identity: &Identity) -> Result<Option<NodeAddress>, DirectoryError> {
        self.check()?;
        Ok(self.get(identity))
    }

    async fn unassign(&self, identity: &Identity) -> Result<(), DirectoryError> {
        self.unassigns.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.entries.lock().unwrap().remove(identity);
        Ok(())
    }
}

#[derive(Clone)]
enum Script {
    Accept,
    NotFound,
    Fail(u16),
}

/// Forwarder that answers every call the same way and records what it saw.
#[derive(Clone)]
pub struct StubForwarder {
    script: Script,
    seen: Arc<Mutex<Vec<(NodeAddress, ChatMessage)>>>,
}

impl StubForwarder {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn accepting() -> Self {
        Self::with_script(Script::Accept)
    }

    pub fn not_found() -> Self {
        Self::with_script(Script::NotFound)
    }

    pub fn failing(status: u16) -> Self {
        Self::with_script(Script::Fail(status))
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<(NodeAddress, ChatMessage)> {
        self.seen.lock().unwrap().last().cloned()
    }
}

impl Forwarder for StubForwarder {
    async fn forward(
        &self,
        node: &NodeAddress,
        message: &ChatMessage,
    ) -> Result<ForwardOutcome, ForwardError> {
        self.seen
            .lock()
            .unwrap()
            .push((node.clone(), message.clone()));
        match self.script {
            Script::Accept => Ok(ForwardOutcome::Accepted),
            Script::NotFound => Ok(ForwardOutcome::RecipientNotFound),
            Script::Fail(status) => Err(ForwardError::Status(status)),
        }
    }
}
