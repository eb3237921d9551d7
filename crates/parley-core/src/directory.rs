//! Directory trait.
//!
//! The Directory is the cluster-wide map from identity to the node currently
//! hosting its session. It is an external shared store; implementations live
//! in parley-infra.

use std::future::Future;

use parley_types::chat::{Identity, NodeAddress};
use parley_types::error::DirectoryError;

/// Shared identity -> node address mapping.
///
/// Entries have no TTL: they live until `unassign` is called. Each call is
/// expected to be atomic per key; callers perform no multi-key transactions.
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait Directory: Send + Sync {
    /// Record that `identity` is hosted by `node`.
    ///
    /// Returns `DirectoryError::Conflict` if the identity is already assigned.
    fn assign(
        &self,
        identity: &Identity,
        node: &NodeAddress,
    ) -> impl Future<Output = Result<(), DirectoryError>> + Send;

    /// Find the node hosting `identity`. `Ok(None)` means not found.
    fn lookup(
        &self,
        identity: &Identity,
    ) -> impl Future<Output = Result<Option<NodeAddress>, DirectoryError>> + Send;

    /// Remove the entry for `identity`. No-op if it does not exist.
    fn unassign(&self, identity: &Identity)
    -> impl Future<Output = Result<(), DirectoryError>> + Send;
}
