//! Application state shared by the client and cluster HTTP surfaces.
//!
//! The core `Router` is generic over its Directory and Forwarder; this
//! module pins it to the concrete infra implementations.

use std::sync::Arc;

use anyhow::Context;
use parley_core::Router as ChatRouter;
use parley_infra::{HttpForwarder, NodeDirectory, connect_directory};
use parley_types::config::NodeConfig;

pub type ConcreteRouter = ChatRouter<NodeDirectory, HttpForwarder>;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ConcreteRouter>,
}

impl AppState {
    /// Connect to the Directory and build the node's router.
    ///
    /// Fails when no directory URL is configured.
    pub async fn init(config: &NodeConfig) -> anyhow::Result<Self> {
        let url = config.directory_url.as_deref().context(
            "no directory configured: set DIRECTORY_URL, REDIS_ADDR or directory_url in the config file",
        )?;
        let directory = connect_directory(url)
            .await
            .with_context(|| format!("failed to open directory at {url}"))?;
        let forwarder = HttpForwarder::new().context("failed to build forwarding client")?;

        let router = ChatRouter::new(directory, forwarder, config.cluster_address())
            .with_identity_attempts(config.identity_attempts);
        Ok(Self::from_router(router))
    }

    pub fn from_router(router: ConcreteRouter) -> Self {
        Self {
            router: Arc::new(router),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_directory_url_is_fatal() {
        let err = AppState::init(&NodeConfig::default()).await.err().unwrap();
        assert!(err.to_string().contains("DIRECTORY_URL"));
    }

    #[tokio::test]
    async fn test_memory_directory_builds_a_router() {
        let config = NodeConfig {
            directory_url: Some("memory://".into()),
            node_ip: "10.0.0.7".into(),
            ..NodeConfig::default()
        };
        let state = AppState::init(&config).await.unwrap();
        assert_eq!(state.router.address().as_str(), "10.0.0.7:3000");
        assert_eq!(state.router.session_count(), 0);
    }
}
