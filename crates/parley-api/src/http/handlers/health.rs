//! Liveness endpoint, mounted on both the client and the cluster port.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /health -- status, version, node address and local session count.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "node": state.router.address().as_str(),
        "sessions": state.router.session_count(),
    }))
}
