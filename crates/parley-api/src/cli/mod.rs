//! CLI definitions for the `parley` binary.

pub mod serve;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use parley_types::config::NodeConfig;

/// Run a node of the parley chat relay.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Detailed output (-v for debug, -vv for trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a node: client WebSocket plus cluster forwarding endpoint.
    Serve(ServeArgs),

    /// Generate shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Settings for `parley serve`. Each flag overrides the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// TOML config file.
    #[arg(long, env = "PARLEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Client-facing HTTP/WebSocket port.
    #[arg(long, env = "HTTP_LISTEN_PORT")]
    pub port: Option<u16>,

    /// Internal forwarding port.
    #[arg(long, env = "CLUSTER_HTTP_LISTEN_PORT")]
    pub cluster_port: Option<u16>,

    /// Address peers use to reach this node.
    #[arg(long, env = "POD_IP")]
    pub node_ip: Option<String>,

    /// Directory backend (`redis://host:port`, `sqlite://<path>?mode=rwc`
    /// or `memory://`).
    #[arg(long, env = "DIRECTORY_URL")]
    pub directory_url: Option<String>,

    /// Redis `host:port` used as the Directory when no URL is given.
    #[arg(long, env = "REDIS_ADDR")]
    pub redis_addr: Option<String>,

    /// Identities tried before giving up on collisions.
    #[arg(long)]
    pub identity_attempts: Option<u32>,
}

impl ServeArgs {
    /// Apply flags and environment on top of `config`.
    pub fn apply(&self, mut config: NodeConfig) -> NodeConfig {
        if let Some(port) = self.port {
            config.client_port = port;
        }
        if let Some(port) = self.cluster_port {
            config.cluster_port = port;
        }
        if let Some(ip) = &self.node_ip {
            config.node_ip = ip.clone();
        }
        if let Some(url) = &self.directory_url {
            config.directory_url = Some(url.clone());
        } else if let Some(addr) = &self.redis_addr {
            config.directory_url = Some(format!("redis://{addr}"));
        }
        if let Some(attempts) = self.identity_attempts {
            config.identity_attempts = attempts;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = ServeArgs {
            cluster_port: Some(3100),
            node_ip: Some("10.0.0.5".into()),
            directory_url: Some("memory://".into()),
            ..ServeArgs::default()
        };
        let config = args.apply(NodeConfig {
            client_port: 9000,
            ..NodeConfig::default()
        });
        assert_eq!(config.client_port, 9000);
        assert_eq!(config.cluster_address().as_str(), "10.0.0.5:3100");
        assert_eq!(config.directory_url.as_deref(), Some("memory://"));
    }

    #[test]
    fn test_redis_addr_becomes_directory_url() {
        let args = ServeArgs {
            redis_addr: Some("redis.chat.svc:6379".into()),
            ..ServeArgs::default()
        };
        let config = args.apply(NodeConfig::default());
        assert_eq!(
            config.directory_url.as_deref(),
            Some("redis://redis.chat.svc:6379")
        );

        // An explicit URL wins over the address.
        let args = ServeArgs {
            directory_url: Some("memory://".into()),
            redis_addr: Some("redis.chat.svc:6379".into()),
            ..ServeArgs::default()
        };
        assert_eq!(
            args.apply(NodeConfig::default()).directory_url.as_deref(),
            Some("memory://")
        );
    }

    #[test]
    fn test_serve_parses_flags() {
        let cli = Cli::try_parse_from([
            "parley",
            "-vv",
            "--json-logs",
            "serve",
            "--port",
            "8080",
            "--directory-url",
            "memory://",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.json_logs);
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.directory_url.as_deref(), Some("memory://"));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
