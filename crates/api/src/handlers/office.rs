//! Handlers for offices and their approvers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use clearance_core::error::WorkflowError;
use clearance_core::types::DbId;
use clearance_db::models::office::{AssignApprover, CreateOffice, Office, OfficeApprover};
use clearance_db::repositories::OfficeRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_office_exists(state: &AppState, id: DbId) -> AppResult<Office> {
    OfficeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Workflow(WorkflowError::NotFound { entity: "Office", id }))
}

/// GET /api/v1/offices
pub async fn list_offices(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Office>>>> {
    let offices = OfficeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: offices }))
}

/// POST /api/v1/admin/offices
pub async fn create_office(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateOffice>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Office name must not be empty".into()));
    }
    let office = OfficeRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = admin.user_id, office_id = office.id, name = %office.name, "Office created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: office })))
}

/// GET /api/v1/offices/{id}/approvers
pub async fn list_office_approvers(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<OfficeApprover>>>> {
    ensure_office_exists(&state, id).await?;
    let approvers = OfficeRepo::list_approvers(&state.pool, id).await?;
    Ok(Json(DataResponse { data: approvers }))
}

/// POST /api/v1/admin/offices/{id}/approvers
///
/// Bind an approver account to the office. Returns the office's approvers.
pub async fn assign_approver(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AssignApprover>,
) -> AppResult<Json<DataResponse<Vec<OfficeApprover>>>> {
    ensure_office_exists(&state, id).await?;

    if !OfficeRepo::assign_approver(&state.pool, id, input.user_id).await? {
        return Err(AppError::BadRequest(format!(
            "User {} does not exist or is not an approver",
            input.user_id
        )));
    }

    tracing::info!(
        user_id = admin.user_id,
        office_id = id,
        approver_id = input.user_id,
        "Approver assigned to office"
    );

    let approvers = OfficeRepo::list_approvers(&state.pool, id).await?;
    Ok(Json(DataResponse { data: approvers }))
}
