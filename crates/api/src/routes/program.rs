use axum::routing::{get, post};
use axum::Router;

use crate::handlers::program;
use crate::state::AppState;

/// Routes mounted at `/programs`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(program::list_programs))
}

/// Routes mounted at `/admin/programs`.
pub fn admin_router() -> Router<AppState> {
    Router::new().route("/", post(program::create_program))
}
