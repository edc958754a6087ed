use axum::routing::{get, post};
use axum::Router;

use crate::handlers::clearance;
use crate::state::AppState;

/// Routes mounted at `/clearances`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(clearance::submit_clearance))
        .route("/mine", get(clearance::list_my_clearances))
        .route("/queue", get(clearance::office_queue))
        .route("/{id}", get(clearance::get_clearance))
        .route("/{id}/actions", get(clearance::list_clearance_actions))
        .route("/{id}/approve", post(clearance::approve_clearance))
        .route("/{id}/reject", post(clearance::reject_clearance))
        .route("/{id}/resubmit", post(clearance::resubmit_clearance))
}
