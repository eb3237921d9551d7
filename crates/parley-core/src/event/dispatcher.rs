//! Multi-source event dispatcher.
//!
//! Each source is drained by its own task into a shared merge channel of
//! capacity [`MERGE_CAPACITY`]. A single loop reads the merged stream and
//! runs the handler registered for each event's kind, awaiting it before
//! reading the next event. Order is preserved per source only.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use parley_types::event::EventKind;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use super::envelope::Event;
use super::handler::EventHandler;
use super::source::{BoxEventSource, EventSource};

/// Events buffered between the drain tasks and the handler loop.
pub const MERGE_CAPACITY: usize = 1;

/// Routes events from several sources to per-kind handlers.
pub struct Dispatcher {
    sources: Mutex<Vec<BoxEventSource>>,
    handlers: DashMap<EventKind, Arc<dyn EventHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            sources: Mutex::new(Vec::new()),
            handlers: DashMap::new(),
        }
    }

    /// Builder-style [`add_source`](Self::add_source).
    pub fn with_source(self, source: impl EventSource + 'static) -> Self {
        self.add_source(source);
        self
    }

    /// Add a source to be drained by the next `listen` call.
    pub fn add_source(&self, source: impl EventSource + 'static) {
        self.lock_sources().push(BoxEventSource::new(source));
    }

    /// Register `handler` for `kind`, replacing any previous one.
    ///
    /// May be called while `listen` is running; the next event of that kind
    /// uses the new handler.
    pub fn handle(&self, kind: EventKind, handler: impl EventHandler + 'static) {
        if self.handlers.insert(kind, Arc::new(handler)).is_some() {
            debug!(%kind, "replaced event handler");
        }
    }

    pub fn has_handler(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Drain every source until all of them end.
    ///
    /// Returns the number of events handed to a handler. Events without a
    /// handler are skipped; handler errors are logged and do not stop the loop.
    pub async fn listen(&self) -> usize {
        let sources = std::mem::take(&mut *self.lock_sources());
        let (tx, mut rx) = mpsc::channel::<Event>(MERGE_CAPACITY);

        let mut drains = JoinSet::new();
        for (index, mut source) in sources.into_iter().enumerate() {
            let tx = tx.clone();
            drains.spawn(async move {
                loop {
                    match source.next_event().await {
                        Ok(Some(event)) => {
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Ok(None) => {
                            debug!(source = index, "event source ended");
                            break;
                        }
                        Err(err) => {
                            warn!(source = index, error = %err, "event source failed");
                            break;
                        }
                    }
                }
            });
        }
        // The merge channel closes once every drain task has dropped its sender.
        drop(tx);

        let mut dispatched = 0;
        while let Some(event) = rx.recv().await {
            let kind = event.kind();
            let handler = self.handlers.get(&kind).map(|h| Arc::clone(h.value()));
            let Some(handler) = handler else {
                debug!(%kind, "no handler registered, skipping event");
                continue;
            };
            if let Err(err) = handler.handle(event).await {
                warn!(%kind, error = %err, "event handler failed");
            }
            dispatched += 1;
        }

        while let Some(joined) = drains.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "event source task panicked");
            }
        }
        dispatched
    }

    fn lock_sources(&self) -> MutexGuard<'_, Vec<BoxEventSource>> {
        self.sources.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("sources", &self.lock_sources().len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
