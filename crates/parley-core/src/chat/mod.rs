//! Session registry and message routing.
//!
//! - `router` -- `Router`, the per-node identity -> mailbox table plus the
//!   local-or-forward delivery decision
//! - `session` -- `Session`, a client's handle on its routed identity
//! - `mailbox` -- bounded per-session inbound queue with a close signal
//! - `forward` -- `Forwarder` port for cross-node delivery
//! - `nickname` -- random `adjective-noun` identities

pub mod forward;
mod mailbox;
pub mod nickname;
pub mod router;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use forward::{ForwardOutcome, Forwarder};
pub use mailbox::MAILBOX_CAPACITY;
pub use router::Router;
pub use session::Session;
