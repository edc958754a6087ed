//! Handlers for academic programs.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use clearance_db::models::program::{CreateProgram, Program};
use clearance_db::repositories::ProgramRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/programs
pub async fn list_programs(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Program>>>> {
    let programs = ProgramRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: programs }))
}

/// POST /api/v1/admin/programs
pub async fn create_program(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateProgram>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Program name must not be empty".into()));
    }
    let program = ProgramRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: program })))
}
