//! parley node entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, initializes tracing, then either prints shell
//! completions or runs a node.

mod cli;
mod http;
mod node;
mod state;

use clap::Parser;
use clap_complete::generate;
use parley_observe::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need logging
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(&TracingOptions {
        verbosity: cli.verbose,
        json: cli.json_logs,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = match cli.command {
        Commands::Serve(args) => cli::serve::run(args).await,
        Commands::Completions { .. } => Ok(()),
    };

    shutdown_tracing();
    result
}
