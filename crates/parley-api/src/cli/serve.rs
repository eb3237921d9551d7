//! `parley serve` -- run a node until Ctrl+C / SIGTERM.

use std::net::Ipv4Addr;

use anyhow::Context;
use parley_infra::config::load_node_config;
use tokio::net::TcpListener;
use tracing::info;

use super::ServeArgs;
use crate::http::router::build_router;
use crate::node::Node;
use crate::state::AppState;

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.apply(load_node_config(args.config.as_deref()).await);
    let state = AppState::init(&config).await?;

    let cluster_listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.cluster_port))
        .await
        .with_context(|| format!("failed to bind cluster port {}", config.cluster_port))?;
    let node = Node::start(state.clone(), cluster_listener)?;

    let client_listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.client_port))
        .await
        .with_context(|| format!("failed to bind client port {}", config.client_port))?;
    let client_addr = client_listener.local_addr()?;

    println!(
        "  {} parley node {} listening on {} (cluster {})",
        console::style("⚡").bold(),
        console::style(node.state().router.address()).yellow(),
        console::style(format!("http://{client_addr}")).cyan(),
        node.cluster_addr(),
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    // Upgraded WebSocket connections are not tracked by graceful shutdown,
    // so sessions are closed as soon as the signal arrives.
    let router = state.router.clone();
    axum::serve(client_listener, build_router(state))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let closed = router.shutdown().await;
            info!(closed, "shutdown requested");
        })
        .await
        .context("client server failed")?;

    node.shutdown().await?;
    println!("\n  Node stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
