use axum::routing::{get, post};
use axum::Router;

use crate::handlers::workflow;
use crate::state::AppState;

/// Routes mounted at `/workflows`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(workflow::list_workflows))
        .route("/resolve", get(workflow::resolve_workflow))
        .route("/{id}", get(workflow::get_workflow))
}

/// Routes mounted at `/admin/workflows`.
pub fn admin_router() -> Router<AppState> {
    Router::new().route("/", post(workflow::publish_workflow))
}
