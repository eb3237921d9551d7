//! Per-connection event multiplexing.
//!
//! - `envelope` -- the `Event` variants flowing through a dispatcher
//! - `source` -- `EventSource` trait and its boxed, object-safe form
//! - `handler` -- `EventHandler` trait with a blanket impl for async closures
//! - `dispatcher` -- `Dispatcher` merging N sources into one handler loop

pub mod dispatcher;
pub mod envelope;
pub mod handler;
pub mod source;

pub use dispatcher::Dispatcher;
pub use envelope::Event;
pub use handler::EventHandler;
pub use source::{BoxEventSource, EventSource};
