//! Node configuration loader.
//!
//! Reads an optional TOML file into [`NodeConfig`]. Falls back to defaults
//! when no path is given, the file is missing, or it cannot be parsed.
//! CLI flags and environment variables are applied on top by the binary.

use std::path::Path;

use parley_types::config::NodeConfig;

/// Load node configuration from `path`.
///
/// - `None` or a missing file returns [`NodeConfig::default()`].
/// - An unreadable or malformed file logs a warning and returns the default.
pub async fn load_node_config(path: Option<&Path>) -> NodeConfig {
    let Some(path) = path else {
        return NodeConfig::default();
    };

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return NodeConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return NodeConfig::default();
        }
    };

    match toml::from_str::<NodeConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            NodeConfig::default()
        }
    }
}
