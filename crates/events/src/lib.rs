//! Clearance notification delivery.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ClearanceEvent`] -- one notification addressed to one user.
//! - [`BusNotificationSink`] -- the engine's sink; publishes intents on the bus.
//! - [`NotificationPersistence`] -- background task writing events to the
//!   `notifications` table.

pub mod bus;
pub mod persistence;
pub mod sink;

pub use bus::{ClearanceEvent, EventBus};
pub use persistence::NotificationPersistence;
pub use sink::BusNotificationSink;
