//! Event handlers.
//!
//! Handlers are stored behind `Arc<dyn EventHandler>` so the trait returns a
//! boxed future. Any `Fn(Event) -> impl Future<Output = anyhow::Result<()>>`
//! closure is a handler.

use std::future::Future;
use std::pin::Pin;

use super::envelope::Event;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// Reacts to one event. Errors are logged by the dispatcher and never stop it.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: Event) -> HandlerFuture<'_>;
}

impl<F, Fut> EventHandler for F
where
    F: Fn(Event) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn handle(&self, event: Event) -> HandlerFuture<'_> {
        Box::pin(self(event))
    }
}
