//! Event sources.
//!
//! Same blanket-impl pattern as the Directory and Forwarder ports:
//! 1. `EventSource` uses RPITIT for zero-cost static dispatch
//! 2. `EventSourceDyn` is the object-safe mirror with boxed futures
//! 3. `BoxEventSource` wraps `Box<dyn EventSourceDyn>` so a dispatcher can
//!    hold heterogeneous sources

use std::future::Future;
use std::pin::Pin;

use parley_types::error::SourceError;

use super::envelope::Event;

/// Something that yields events until it runs dry.
pub trait EventSource: Send {
    /// Wait for the next event.
    ///
    /// `Ok(None)` is end-of-stream. An error also ends the source.
    fn next_event(&mut self) -> impl Future<Output = Result<Option<Event>, SourceError>> + Send;
}

/// Object-safe version of [`EventSource`].
pub trait EventSourceDyn: Send {
    fn next_event_boxed(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Event>, SourceError>> + Send + '_>>;
}

impl<T: EventSource> EventSourceDyn for T {
    fn next_event_boxed(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Event>, SourceError>> + Send + '_>> {
        Box::pin(self.next_event())
    }
}

/// Type-erased event source.
pub struct BoxEventSource {
    inner: Box<dyn EventSourceDyn>,
}

impl BoxEventSource {
    pub fn new<T: EventSource + 'static>(source: T) -> Self {
        Self {
            inner: Box::new(source),
        }
    }

    pub async fn next_event(&mut self) -> Result<Option<Event>, SourceError> {
        self.inner.next_event_boxed().await
    }
}

impl std::fmt::Debug for BoxEventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxEventSource").finish_non_exhaustive()
    }
}
