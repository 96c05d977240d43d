//! Progress event delivery
//!
//! The pipeline hands every [`ProgressEvent`] to an [`EventRelay`]. Delivery
//! is best effort: a relay with nobody listening drops the event and the
//! download carries on.

use crate::types::ProgressEvent;
use tokio::sync::broadcast;

/// Sink for progress events
///
/// Implementations must not block. Closures of type `Fn(&ProgressEvent)`
/// implement this trait directly.
pub trait EventRelay: Send + Sync {
    /// Deliver one event, dropping it if it cannot be delivered
    fn emit(&self, event: &ProgressEvent);
}

impl<F> EventRelay for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Relay that discards every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpRelay;

impl EventRelay for NoOpRelay {
    fn emit(&self, _event: &ProgressEvent) {}
}

/// Relay that fans events out to any number of subscribers
///
/// Subscribers that fall more than `capacity` events behind observe
/// [`broadcast::error::RecvError::Lagged`] and skip ahead.
#[derive(Clone, Debug)]
pub struct BroadcastRelay {
    tx: broadcast::Sender<ProgressEvent>,
}

impl BroadcastRelay {
    /// Create a relay buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventRelay for BroadcastRelay {
    fn emit(&self, event: &ProgressEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::trace!(stage = ?event.stage, "no progress subscribers, event dropped");
        }
    }
}

/// Forwards each event to two relays in order
pub(crate) struct Tee<'a> {
    pub(crate) first: &'a dyn EventRelay,
    pub(crate) second: &'a dyn EventRelay,
}

impl EventRelay for Tee<'_> {
    fn emit(&self, event: &ProgressEvent) {
        self.first.emit(event);
        self.second.emit(event);
    }
}
