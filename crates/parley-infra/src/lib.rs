//! Infrastructure layer for parley.
//!
//! Implements the ports defined in `parley-core`: Directory backends (Redis,
//! SQLite with WAL and split pools, in-memory), the HTTP forwarder used for
//! cross-node delivery, and the node configuration loader.

pub mod cluster;
pub mod config;
pub mod directory;
pub mod sqlite;

pub use cluster::HttpForwarder;
pub use directory::{
    MemoryDirectory, NodeDirectory, RedisDirectory, SqliteDirectory, connect_directory,
};
