//! HTTP and WebSocket request handlers.

pub mod chat;
pub mod health;
pub mod index;
