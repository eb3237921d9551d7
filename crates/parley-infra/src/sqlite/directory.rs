//! SQLite-backed Directory.
//!
//! One row per assigned identity. The primary key on `identity` makes
//! `assign` atomic: a second assignment of a live identity fails with a
//! unique violation, surfaced as `DirectoryError::Conflict`.

use chrono::Utc;
use parley_core::directory::Directory;
use parley_types::chat::{Identity, NodeAddress};
use parley_types::error::DirectoryError;
use sqlx::Row;

use super::pool::DatabasePool;

pub struct SqliteDirectory {
    pool: DatabasePool,
}

impl SqliteDirectory {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Open the database at `url` and run migrations.
    pub async fn connect(url: &str) -> Result<Self, DirectoryError> {
        let pool = DatabasePool::new(url).await.map_err(backend)?;
        Ok(Self::new(pool))
    }
}

fn backend(err: sqlx::Error) -> DirectoryError {
    DirectoryError::Backend(err.to_string())
}

impl Directory for SqliteDirectory {
    async fn assign(&self, identity: &Identity, node: &NodeAddress) -> Result<(), DirectoryError> {
        let result = sqlx::query(
            "INSERT INTO directory_entries (identity, node_address, assigned_at) VALUES (?, ?, ?)",
        )
        .bind(identity.as_str())
        .bind(node.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DirectoryError::Conflict(identity.clone()))
            }
            Err(err) => Err(backend(err)),
        }
    }

    async fn lookup(&self, identity: &Identity) -> Result<Option<NodeAddress>, DirectoryError> {
        let row = sqlx::query("SELECT node_address FROM directory_entries WHERE identity = ?")
            .bind(identity.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(backend)?;

        match row {
            Some(row) => {
                let address: String = row.try_get("node_address").map_err(backend)?;
                Ok(Some(NodeAddress::new(address)))
            }
            None => Ok(None),
        }
    }

    async fn unassign(&self, identity: &Identity) -> Result<(), DirectoryError> {
        sqlx::query("DELETE FROM directory_entries WHERE identity = ?")
            .bind(identity.as_str())
            .execute(&self.pool.writer)
            .await
            .map_err(backend)?;
        Ok(())
    }
}
