//! HTTP surfaces of a node.
//!
//! - `router` -- client-facing router: chat page, `/chat` WebSocket, health
//! - `cluster` -- internal forwarding endpoint peers call (`POST /send`)
//! - `handlers` -- request handlers shared by both
//! - `error` -- error type mapped to HTTP status codes

pub mod cluster;
pub mod error;
pub mod handlers;
pub mod router;
