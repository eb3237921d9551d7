//! In-process Directory for single-node runs and tests.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parley_core::directory::Directory;
use parley_types::chat::{Identity, NodeAddress};
use parley_types::error::DirectoryError;

/// Directory kept in a concurrent map. Only visible to this process.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    entries: DashMap<Identity, NodeAddress>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Directory for MemoryDirectory {
    async fn assign(&self, identity: &Identity, node: &NodeAddress) -> Result<(), DirectoryError> {
        match self.entries.entry(identity.clone()) {
            Entry::Occupied(_) => Err(DirectoryError::Conflict(identity.clone())),
            Entry::Vacant(slot) => {
                slot.insert(node.clone());
                Ok(())
            }
        }
    }

    async fn lookup(&self, identity: &Identity) -> Result<Option<NodeAddress>, DirectoryError> {
        Ok(self.entries.get(identity).map(|e| e.value().clone()))
    }

    async fn unassign(&self, identity: &Identity) -> Result<(), DirectoryError> {
        self.entries.remove(identity);
        Ok(())
    }
}
