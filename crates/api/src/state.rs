use std::sync::Arc;

use clearance_core::engine::ClearanceEngine;
use clearance_db::PgClearanceStore;
use clearance_events::{BusNotificationSink, EventBus};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: clearance_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Workflow engine over the PostgreSQL store, publishing to `event_bus`.
    pub engine: ClearanceEngine,
    /// Notification bus; persistence subscribes at startup.
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    /// Wire the engine to the pool and bus.
    pub fn new(pool: clearance_db::DbPool, config: ServerConfig, event_bus: Arc<EventBus>) -> Self {
        let engine = ClearanceEngine::new(
            Arc::new(PgClearanceStore::new(pool.clone())),
            Arc::new(BusNotificationSink::new(Arc::clone(&event_bus))),
        );
        Self {
            pool,
            config: Arc::new(config),
            engine,
            event_bus,
        }
    }
}
