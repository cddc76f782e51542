//! Injectable event observers
//!
//! Components report progress and warning conditions through an [`Observer`]
//! instead of writing to a global logger, so callers (and tests) decide what
//! happens to them.

use crate::types::Event;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Receives pipeline events
pub trait Observer: Send + Sync {
    /// Called once per event, in emission order
    fn notify(&self, event: &Event);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn notify(&self, _event: &Event) {}
}

/// Forwards events to `tracing`, warnings at WARN level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn notify(&self, event: &Event) {
        match event {
            Event::Fetched { stage, url, path } => {
                info!(%stage, url, ?path, "download complete")
            }
            Event::LinkResolved { link, match_count } => {
                info!(link, match_count, "download link resolved")
            }
            Event::LinkNotFound { classification } => {
                warn!(classification, "no download link found in listing")
            }
            Event::DuplicateMatches { stage, count } => {
                warn!(%stage, count, "multiple candidates matched, using the first")
            }
            Event::EntryExtracted { path, match_count } => {
                info!(?path, match_count, "archive entry extracted")
            }
            Event::NoMatchingEntry { archive, suffix } => {
                warn!(?archive, suffix, "no matching entry in archive")
            }
            Event::RecordsExtracted { document, rows } => {
                info!(?document, rows, "records extracted")
            }
            Event::NoRecords { document } => {
                warn!(?document, "document contained no terminated records")
            }
            Event::OutputWritten { path, rows } => info!(?path, rows, "CSV written"),
            Event::Uploaded { destination } => info!(destination, "output uploaded"),
            Event::Failed { stage, error } => error!(%stage, error, "pipeline step failed"),
        }
    }
}

/// Publishes events on a broadcast channel
///
/// Sending never blocks; events are dropped when nobody is subscribed.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: broadcast::Sender<Event>,
}

impl ChannelObserver {
    /// Create an observer whose channel buffers up to `capacity` events
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for ChannelObserver {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Observer for ChannelObserver {
    fn notify(&self, event: &Event) {
        let _ = self.tx.send(event.clone());
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Events for which [`Event::is_warning`] holds
    pub fn warnings(&self) -> Vec<Event> {
        self.events().into_iter().filter(Event::is_warning).collect()
    }
}

impl Observer for RecordingObserver {
    fn notify(&self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Sends each event to several observers in turn
#[derive(Default)]
pub struct FanOut {
    observers: Vec<std::sync::Arc<dyn Observer>>,
}

impl FanOut {
    /// Create an empty fan-out
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer
    pub fn with(mut self, observer: std::sync::Arc<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }
}

impl Observer for FanOut {
    fn notify(&self, event: &Event) {
        for observer in &self.observers {
            observer.notify(event);
        }
    }
}
