//! Redis-backed Directory for multi-node clusters.
//!
//! Keys are identities and values are node addresses, stored in the
//! selected database without expiry. `SET ... NX` keeps `assign` atomic
//! across nodes.

use parley_core::directory::Directory;
use parley_types::chat::{Identity, NodeAddress};
use parley_types::error::DirectoryError;
use redis::aio::MultiplexedConnection;
use tracing::debug;

#[derive(Clone)]
pub struct RedisDirectory {
    connection: MultiplexedConnection,
}

impl RedisDirectory {
    /// Connect to `url` (`redis://[:password@]host:port[/db]`) and check that
    /// the server answers a PING.
    pub async fn connect(url: &str) -> Result<Self, DirectoryError> {
        let client = redis::Client::open(url).map_err(backend)?;
        let mut connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(backend)?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(backend)?;
        debug!(%pong, "redis directory reachable");
        Ok(Self { connection })
    }
}

fn backend(err: redis::RedisError) -> DirectoryError {
    DirectoryError::Backend(err.to_string())
}

impl Directory for RedisDirectory {
    async fn assign(&self, identity: &Identity, node: &NodeAddress) -> Result<(), DirectoryError> {
        let mut connection = self.connection.clone();
        // Nil reply means the key already exists.
        let stored: Option<String> = redis::cmd("SET")
            .arg(identity.as_str())
            .arg(node.as_str())
            .arg("NX")
            .query_async(&mut connection)
            .await
            .map_err(backend)?;

        match stored {
            Some(_) => Ok(()),
            None => Err(DirectoryError::Conflict(identity.clone())),
        }
    }

    async fn lookup(&self, identity: &Identity) -> Result<Option<NodeAddress>, DirectoryError> {
        let mut connection = self.connection.clone();
        let address: Option<String> = redis::cmd("GET")
            .arg(identity.as_str())
            .query_async(&mut connection)
            .await
            .map_err(backend)?;
        Ok(address.map(NodeAddress::new))
    }

    async fn unassign(&self, identity: &Identity) -> Result<(), DirectoryError> {
        let mut connection = self.connection.clone();
        redis::cmd("DEL")
            .arg(identity.as_str())
            .query_async::<()>(&mut connection)
            .await
            .map_err(backend)?;
        Ok(())
    }
}
