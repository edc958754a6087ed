//! [`NotificationSink`] that forwards intents onto the [`EventBus`].

use std::sync::Arc;

use clearance_core::notification::NotificationIntent;
use clearance_core::store::NotificationSink;

use crate::bus::{ClearanceEvent, EventBus};

/// Publishes every intent as a [`ClearanceEvent`]. Never blocks the caller.
#[derive(Clone)]
pub struct BusNotificationSink {
    bus: Arc<EventBus>,
}

impl BusNotificationSink {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

impl NotificationSink for BusNotificationSink {
    fn deliver(&self, intents: &[NotificationIntent]) {
        for intent in intents {
            if self.bus.publish(ClearanceEvent::from(intent)) == 0 {
                tracing::warn!(
                    request_id = intent.request_id,
                    recipient_user_id = intent.recipient_user_id,
                    kind = %intent.kind,
                    "No subscribers, notification dropped"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearance_core::notification::NotificationKind;

    #[tokio::test]
    async fn delivers_each_intent_in_order() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let sink = BusNotificationSink::new(bus.clone());

        sink.deliver(&[
            NotificationIntent {
                recipient_user_id: 100,
                request_id: 1,
                kind: NotificationKind::Advanced,
                payload: serde_json::json!({"current_step": 2}),
            },
            NotificationIntent {
                recipient_user_id: 21,
                request_id: 1,
                kind: NotificationKind::StepAssigned,
                payload: serde_json::json!({"step_order": 2}),
            },
        ]);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.recipient_user_id, 100);
        assert_eq!(first.kind, NotificationKind::Advanced);
        assert_eq!(second.recipient_user_id, 21);
        assert_eq!(second.kind, NotificationKind::StepAssigned);
    }

    #[test]
    fn delivering_without_subscribers_is_harmless() {
        let sink = BusNotificationSink::new(Arc::new(EventBus::default()));
        sink.deliver(&[NotificationIntent {
            recipient_user_id: 1,
            request_id: 1,
            kind: NotificationKind::Completed,
            payload: serde_json::json!({}),
        }]);
    }
}
