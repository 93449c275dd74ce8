//! In-process event bus for formation notifications.

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use formation_core::{Event, EventSink};

/// `EventSink` publishing onto a tokio broadcast channel.
///
/// Sending never blocks; with no subscribers the event is dropped.
#[derive(Clone)]
pub struct BroadcastEventSink {
    tx: broadcast::Sender<Event>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl EventSink for BroadcastEventSink {
    fn send(&self, event: Event) {
        if let Err(e) = self.tx.send(event) {
            debug!(action = %e.0.action, "event dropped, no subscribers");
        }
    }
}

/// Log every published event until shutdown.
pub async fn log_events(
    mut events: broadcast::Receiver<Event>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => info!(action = %event.action, data = ?event.data, "event"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event logger lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = shutdown.changed() => {
                debug!("event logger shutting down");
                break;
            }
        }
    }
}
