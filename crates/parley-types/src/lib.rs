//! Shared domain types for parley.
//!
//! Identities, node addresses, the chat message envelope, event tags, node
//! configuration and the error taxonomy shared by every other crate.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod event;
