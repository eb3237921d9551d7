//! Directory backends and URL-based selection.
//!
//! - `sqlite://<path>?mode=rwc` -- [`SqliteDirectory`], shared by every node
//!   pointing at the same database file
//! - `redis://host:port[/db]` -- [`RedisDirectory`], the cluster store
//! - `memory://` -- [`MemoryDirectory`], visible to this process only

pub mod memory;
pub mod redis;

use parley_core::directory::Directory;
use parley_types::chat::{Identity, NodeAddress};
use parley_types::error::DirectoryError;
use tracing::info;

pub use crate::sqlite::SqliteDirectory;
pub use memory::MemoryDirectory;
pub use self::redis::RedisDirectory;

/// Directory backend chosen at startup.
pub enum NodeDirectory {
    Redis(RedisDirectory),
    Sqlite(SqliteDirectory),
    Memory(MemoryDirectory),
}

impl NodeDirectory {
    pub fn backend_name(&self) -> &'static str {
        match self {
            NodeDirectory::Redis(_) => "redis",
            NodeDirectory::Sqlite(_) => "sqlite",
            NodeDirectory::Memory(_) => "memory",
        }
    }
}

/// Open the Directory named by `url`.
pub async fn connect_directory(url: &str) -> Result<NodeDirectory, DirectoryError> {
    let directory = if url.starts_with("redis:") {
        NodeDirectory::Redis(RedisDirectory::connect(url).await?)
    } else if url.starts_with("sqlite:") {
        NodeDirectory::Sqlite(SqliteDirectory::connect(url).await?)
    } else if url.starts_with("memory:") {
        NodeDirectory::Memory(MemoryDirectory::new())
    } else {
        return Err(DirectoryError::Backend(format!(
            "unsupported directory url '{url}' (expected redis://, sqlite:// or memory://)"
        )));
    };
    info!(backend = directory.backend_name(), "directory connected");
    Ok(directory)
}

impl Directory for NodeDirectory {
    async fn assign(&self, identity: &Identity, node: &NodeAddress) -> Result<(), DirectoryError> {
        match self {
            NodeDirectory::Redis(d) => d.assign(identity, node).await,
            NodeDirectory::Sqlite(d) => d.assign(identity, node).await,
            NodeDirectory::Memory(d) => d.assign(identity, node).await,
        }
    }

    async fn lookup(&self, identity: &Identity) -> Result<Option<NodeAddress>, DirectoryError> {
        match self {
            NodeDirectory::Redis(d) => d.lookup(identity).await,
            NodeDirectory::Sqlite(d) => d.lookup(identity).await,
            NodeDirectory::Memory(d) => d.lookup(identity).await,
        }
    }

    async fn unassign(&self, identity: &Identity) -> Result<(), DirectoryError> {
        match self {
            NodeDirectory::Redis(d) => d.unassign(identity).await,
            NodeDirectory::Sqlite(d) => d.unassign(identity).await,
            NodeDirectory::Memory(d) => d.unassign(identity).await,
        }
    }
}
