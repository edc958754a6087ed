//! Handlers for clearance requests: submission, the approval chain, and
//! read access for requesters, approvers, and admins.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use clearance_core::clearance::{normalize_comment, ApprovalAction, ClearanceRequest};
use clearance_core::engine::{SubmitClearance, TransitionReport};
use clearance_core::error::WorkflowError;
use clearance_core::resolver;
use clearance_core::roles::{ROLE_ADMIN, ROLE_APPROVER};
use clearance_core::types::DbId;
use clearance_core::workflow::WorkflowStep;
use clearance_db::models::clearance::{DecisionRequest, ResubmitRequest, SubmitClearanceRequest};
use clearance_db::repositories::ClearanceRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireApprover, RequireRequester};
use crate::response::DataResponse;
use crate::state::AppState;

/// A request with its captured workflow and full history.
#[derive(Debug, Serialize)]
pub struct ClearanceDetail {
    pub request: ClearanceRequest,
    pub steps: Vec<WorkflowStep>,
    pub actions: Vec<ApprovalAction>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a request and its steps, enforcing read access.
///
/// Admins see everything, requesters see their own requests, and approvers
/// see requests whose workflow passes through their office.
async fn load_visible(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<(ClearanceRequest, Vec<WorkflowStep>)> {
    let store = state.engine.store();
    let request = store
        .find_request(id)
        .await?
        .ok_or(WorkflowError::NotFound {
            entity: "ClearanceRequest",
            id,
        })?;
    let steps = resolver::resolve_rule(store, request.workflow_rule_id).await?;

    let visible = auth.role == ROLE_ADMIN
        || request.requester_id == auth.user_id
        || (auth.role == ROLE_APPROVER
            && auth
                .office_id
                .is_some_and(|office| steps.iter().any(|s| s.office_id == office)));
    if !visible {
        return Err(AppError::Forbidden(format!(
            "Not allowed to view clearance request {id}"
        )));
    }
    Ok((request, steps))
}

// ---------------------------------------------------------------------------
// Requester operations
// ---------------------------------------------------------------------------

/// POST /api/v1/clearances
///
/// File a new clearance request at step 1 of the active workflow.
pub async fn submit_clearance(
    RequireRequester(auth): RequireRequester,
    State(state): State<AppState>,
    Json(input): Json<SubmitClearanceRequest>,
) -> AppResult<impl IntoResponse> {
    let report = state
        .engine
        .submit(
            auth.actor(),
            &SubmitClearance {
                form_type: input.form_type,
                program_id: input.program_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// GET /api/v1/clearances/mine
pub async fn list_my_clearances(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ClearanceRequest>>>> {
    let requests = ClearanceRepo::list_for_requester(&state.pool, auth.user_id)
        .await?
        .into_iter()
        .map(|row| row.into_domain())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/clearances/{id}/resubmit
///
/// Restart a rejected request from step 1. Only its requester may call this.
/// The body is optional.
pub async fn resubmit_clearance(
    RequireRequester(auth): RequireRequester,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<ResubmitRequest>>,
) -> AppResult<Json<DataResponse<TransitionReport>>> {
    let expected_version = input.and_then(|Json(body)| body.expected_version);
    let report = state
        .engine
        .resubmit(id, auth.actor(), expected_version)
        .await?;
    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// Approver operations
// ---------------------------------------------------------------------------

/// GET /api/v1/clearances/queue
///
/// Pending requests whose current step belongs to the caller's office.
pub async fn office_queue(
    RequireApprover(_auth, office_id): RequireApprover,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ClearanceRequest>>>> {
    let requests = ClearanceRepo::list_queue_for_office(&state.pool, office_id)
        .await?
        .into_iter()
        .map(|row| row.into_domain())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/clearances/{id}/approve
pub async fn approve_clearance(
    RequireApprover(auth, _office_id): RequireApprover,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DecisionRequest>,
) -> AppResult<Json<DataResponse<TransitionReport>>> {
    let report = state
        .engine
        .approve(
            id,
            auth.actor(),
            normalize_comment(input.comment.as_deref()),
            input.expected_version,
        )
        .await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/clearances/{id}/reject
///
/// The comment is required and becomes the rejection reason.
pub async fn reject_clearance(
    RequireApprover(auth, _office_id): RequireApprover,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DecisionRequest>,
) -> AppResult<Json<DataResponse<TransitionReport>>> {
    let report = state
        .engine
        .reject(id, auth.actor(), input.comment, input.expected_version)
        .await?;
    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/clearances/{id}
pub async fn get_clearance(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ClearanceDetail>>> {
    let (request, steps) = load_visible(&state, &auth, id).await?;
    let actions = state.engine.history(id).await?;
    Ok(Json(DataResponse {
        data: ClearanceDetail {
            request,
            steps,
            actions,
        },
    }))
}

/// GET /api/v1/clearances/{id}/actions
///
/// Approval history across all resubmission rounds, oldest first.
pub async fn list_clearance_actions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ApprovalAction>>>> {
    load_visible(&state, &auth, id).await?;
    let actions = state.engine.history(id).await?;
    Ok(Json(DataResponse { data: actions }))
}
