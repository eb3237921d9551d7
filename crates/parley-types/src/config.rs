//! Node configuration types.
//!
//! `NodeConfig` is read from an optional `parley.toml` and then overridden by
//! CLI flags and environment variables. All fields except `directory_url`
//! have defaults; a node refuses to start without a directory.

use serde::{Deserialize, Serialize};

use crate::chat::NodeAddress;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Port of the client-facing HTTP/WebSocket listener.
    #[serde(default = "default_client_port")]
    pub client_port: u16,

    /// Port of the internal forwarding endpoint.
    #[serde(default = "default_cluster_port")]
    pub cluster_port: u16,

    /// IP (or host name) peers use to reach this node's forwarding endpoint.
    #[serde(default = "default_node_ip")]
    pub node_ip: String,

    /// Directory backend URL (`sqlite://...` or `memory://`).
    #[serde(default)]
    pub directory_url: Option<String>,

    /// How many identities to try before giving up on a collision streak.
    #[serde(default = "default_identity_attempts")]
    pub identity_attempts: u32,
}

fn default_client_port() -> u16 {
    8000
}

fn default_cluster_port() -> u16 {
    3000
}

fn default_node_ip() -> String {
    "127.0.0.1".to_string()
}

fn default_identity_attempts() -> u32 {
    5
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            client_port: default_client_port(),
            cluster_port: default_cluster_port(),
            node_ip: default_node_ip(),
            directory_url: None,
            identity_attempts: default_identity_attempts(),
        }
    }
}

impl NodeConfig {
    /// Address this node registers in the Directory.
    pub fn cluster_address(&self) -> NodeAddress {
        NodeAddress::new(format!("{}:{}", self.node_ip, self.cluster_port))
    }
}
