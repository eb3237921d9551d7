//! Node lifecycle: serving the cluster forwarding endpoint and shutting down.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::http::cluster::build_cluster_router;
use crate::state::AppState;

/// A running node: the shared router plus the background cluster endpoint.
pub struct Node {
    state: AppState,
    cluster_addr: SocketAddr,
    stop: CancellationToken,
    server: JoinHandle<std::io::Result<()>>,
}

impl Node {
    /// Start serving the forwarding endpoint on `listener` in the background.
    pub fn start(state: AppState, listener: TcpListener) -> anyhow::Result<Self> {
        let cluster_addr = listener
            .local_addr()
            .context("cluster listener has no local address")?;
        let stop = CancellationToken::new();

        let app = build_cluster_router(state.clone());
        let signal = stop.clone().cancelled_owned();
        let server =
            tokio::spawn(async move { axum::serve(listener, app).with_graceful_shutdown(signal).await });

        info!(%cluster_addr, node = %state.router.address(), "cluster endpoint listening");
        Ok(Self {
            state,
            cluster_addr,
            stop,
            server,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Local address the forwarding endpoint is bound to.
    pub fn cluster_addr(&self) -> SocketAddr {
        self.cluster_addr
    }

    /// Close every session, then stop the forwarding endpoint.
    ///
    /// In-flight forwarding requests are allowed to finish. Returns the
    /// number of sessions closed.
    pub async fn shutdown(self) -> anyhow::Result<usize> {
        let closed = self.state.router.shutdown().await;
        self.stop.cancel();
        self.server
            .await
            .context("cluster endpoint task failed")?
            .context("cluster endpoint stopped with an error")?;
        info!(closed, "node stopped");
        Ok(closed)
    }
}
