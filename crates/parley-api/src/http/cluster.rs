//! Internal forwarding endpoint.
//!
//! Peers deliver messages for sessions hosted here with
//! `POST /send` and a JSON [`ChatMessage`] body:
//!
//! | status | meaning                              |
//! |--------|--------------------------------------|
//! | 200    | enqueued for the local session       |
//! | 400    | body is not a chat message           |
//! | 404    | recipient has no session on this node |
//! | 500    | local delivery failed                |

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use parley_types::chat::ChatMessage;
use tower_http::trace::TraceLayer;

use crate::http::error::AppError;
use crate::http::handlers;
use crate::state::AppState;

/// Build the router served on the cluster port.
pub fn build_cluster_router(state: AppState) -> Router {
    Router::new()
        .route("/send", post(deliver_inbound))
        .route("/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Deliver a forwarded message to a local session. Never re-forwards.
async fn deliver_inbound(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let message: ChatMessage = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid chat message: {e}")))?;
    tracing::debug!(from = %message.from, to = %message.to, "inbound forward");
    state.router.inbound_forward(message).await?;
    Ok(StatusCode::OK)
}
