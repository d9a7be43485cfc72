//! In-process live event fan-out
//!
//! ```text
//! workflow code ──▶ LiveHub::publish() ──▶ broadcast::Sender<LiveEvent>
//!                                                  │
//!                              ┌───────────────────┴──────┐
//!                              ▼                          ▼
//!                     socket forwarder task          test subscribers
//!                     (io.to(room).emit)
//! ```

use serde::Serialize;
use shared::live::{LiveEvent, LiveEventKind, room};
use tokio::sync::broadcast;

/// Default capacity of the broadcast channel
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct LiveHub {
    tx: broadcast::Sender<LiveEvent>,
}

impl Default for LiveHub {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl LiveHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event; having no subscriber is not an error
    pub fn publish(&self, event: LiveEvent) {
        let room = event.room.clone();
        let kind = event.event;
        if self.tx.send(event).is_err() {
            tracing::debug!(room = %room, event = %kind, "No live subscribers, event dropped");
        }
    }

    /// Serialize `payload` and publish it to `room`
    pub fn emit<T: Serialize>(&self, room: impl Into<String>, kind: LiveEventKind, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(value) => self.publish(LiveEvent::new(room, kind, value)),
            Err(e) => tracing::error!(event = %kind, error = %e, "Failed to serialize live payload"),
        }
    }

    /// Publish the same payload to a restaurant and a customer
    pub fn emit_to_both<T: Serialize>(
        &self,
        restaurant_id: i64,
        customer_id: i64,
        kind: LiveEventKind,
        payload: &T,
    ) {
        self.emit(room::restaurant(restaurant_id), kind, payload);
        self.emit(room::customer(customer_id), kind, payload);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
