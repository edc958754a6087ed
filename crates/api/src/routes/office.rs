use axum::routing::{get, post};
use axum::Router;

use crate::handlers::office;
use crate::state::AppState;

/// Routes mounted at `/offices`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(office::list_offices))
        .route("/{id}/approvers", get(office::list_office_approvers))
}

/// Routes mounted at `/admin/offices`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", post(office::create_office))
        .route("/{id}/approvers", post(office::assign_approver))
}
