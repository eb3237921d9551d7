//! Routing core of the parley chat relay.
//!
//! This crate defines the ports (`Directory`, `Forwarder`) that the
//! infrastructure layer implements, the per-node `Router` and `Session`, and
//! the per-connection event `Dispatcher`. It depends only on `parley-types`
//! -- never on `parley-infra` or any network/database crate.

pub mod chat;
pub mod directory;
pub mod event;

pub use chat::{Router, Session};
pub use directory::Directory;
