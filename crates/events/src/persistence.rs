//! Durable notification persistence service.
//!
//! [`NotificationPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes every received [`ClearanceEvent`] to the `notifications`
//! table. It runs as a long-lived background task and shuts down when the
//! bus sender is dropped.

use clearance_db::models::notification::{CreateNotification, Notification};
use clearance_db::repositories::NotificationRepo;
use clearance_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::ClearanceEvent;

/// Background service that persists notifications to the database.
pub struct NotificationPersistence;

impl NotificationPersistence {
    /// Run the persistence loop until the channel closes.
    ///
    /// Write failures are logged and skipped; they never reach the engine.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<ClearanceEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            request_id = event.clearance_request_id,
                            recipient_user_id = event.recipient_user_id,
                            "Failed to persist notification"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Notification persistence lagged, some notifications were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event as a `notifications` row.
    pub async fn persist(pool: &DbPool, event: &ClearanceEvent) -> Result<Notification, sqlx::Error> {
        NotificationRepo::create(
            pool,
            &CreateNotification {
                user_id: event.recipient_user_id,
                clearance_request_id: event.clearance_request_id,
                kind: event.kind.as_str().to_string(),
                payload: event.payload.clone(),
            },
        )
        .await
    }
}
