//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` between the engine's sink and
//! every subscriber (persistence, tests).

use chrono::{DateTime, Utc};
use clearance_core::notification::{NotificationIntent, NotificationKind};
use clearance_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ClearanceEvent
// ---------------------------------------------------------------------------

/// A notification for one recipient about one clearance request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearanceEvent {
    /// Dot-separated event name, e.g. `"clearance.step_assigned"`.
    pub event_type: String,

    pub kind: NotificationKind,

    pub recipient_user_id: DbId,

    pub clearance_request_id: DbId,

    /// Kind-specific data (current step, office, rejection reason).
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ClearanceEvent {
    /// Create an event with an empty payload.
    pub fn new(kind: NotificationKind, recipient_user_id: DbId, clearance_request_id: DbId) -> Self {
        Self {
            event_type: format!("clearance.{kind}"),
            kind,
            recipient_user_id,
            clearance_request_id,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

impl From<&NotificationIntent> for ClearanceEvent {
    fn from(intent: &NotificationIntent) -> Self {
        ClearanceEvent::new(intent.kind, intent.recipient_user_id, intent.request_id)
            .with_payload(intent.payload.clone())
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<ClearanceEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that will see it; zero means the
    /// event was dropped.
    pub fn publish(&self, event: ClearanceEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClearanceEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
