//! Handlers for the workflow catalog: listing, resolution preview, and
//! publishing new rule versions.

use std::collections::BTreeSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use clearance_core::error::WorkflowError;
use clearance_core::form_type::FormType;
use clearance_core::resolver::{self, ResolvedWorkflow};
use clearance_core::types::DbId;
use clearance_core::workflow::{validate_office_chain, WorkflowStep};
use clearance_db::models::workflow::{PublishWorkflowRule, WorkflowRuleRow, WorkflowRuleWithSteps};
use clearance_db::repositories::{OfficeRepo, WorkflowRepo};
use clearance_db::DbPool;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /workflows/resolve`.
#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub form_type: FormType,
    pub program_id: Option<DbId>,
}

async fn with_steps(pool: &DbPool, row: WorkflowRuleRow) -> AppResult<WorkflowRuleWithSteps> {
    let steps = WorkflowRepo::list_steps(pool, row.id)
        .await?
        .into_iter()
        .map(WorkflowStep::from)
        .collect();
    Ok(WorkflowRuleWithSteps {
        rule: row.into_domain()?,
        steps,
    })
}

/// GET /api/v1/workflows
///
/// Every active rule with its ordered steps.
pub async fn list_workflows(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<WorkflowRuleWithSteps>>>> {
    let rows = WorkflowRepo::list_active(&state.pool).await?;
    let mut rules = Vec::with_capacity(rows.len());
    for row in rows {
        rules.push(with_steps(&state.pool, row).await?);
    }
    Ok(Json(DataResponse { data: rules }))
}

/// GET /api/v1/workflows/resolve?form_type=&program_id=
///
/// Preview which offices a submission would go through.
pub async fn resolve_workflow(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ResolveParams>,
) -> AppResult<Json<DataResponse<ResolvedWorkflow>>> {
    let resolved =
        resolver::resolve(state.engine.store(), params.form_type, params.program_id).await?;
    Ok(Json(DataResponse { data: resolved }))
}

/// GET /api/v1/workflows/{id}
///
/// Any rule version, including retired ones still referenced by requests.
pub async fn get_workflow(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<WorkflowRuleWithSteps>>> {
    let row = WorkflowRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(WorkflowError::NotFound {
            entity: "WorkflowRule",
            id,
        })?;
    Ok(Json(DataResponse {
        data: with_steps(&state.pool, row).await?,
    }))
}

/// POST /api/v1/admin/workflows
///
/// Publish a new version of the rule for `(form_type, program_id)`. The
/// previous version is retired; requests already filed keep using it.
pub async fn publish_workflow(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<PublishWorkflowRule>,
) -> AppResult<impl IntoResponse> {
    input.form_type.validate_program(input.program_id)?;
    validate_office_chain(&input.office_ids)?;

    let distinct: BTreeSet<DbId> = input.office_ids.iter().copied().collect();
    let ids: Vec<DbId> = distinct.into_iter().collect();
    let existing = OfficeRepo::count_existing(&state.pool, &ids).await?;
    if existing != ids.len() as i64 {
        return Err(AppError::BadRequest(
            "Every step must reference an existing office".into(),
        ));
    }

    let (rule, steps) = WorkflowRepo::publish(&state.pool, &input, Some(admin.user_id)).await?;
    let published = WorkflowRuleWithSteps {
        rule: rule.into_domain()?,
        steps: steps.into_iter().map(WorkflowStep::from).collect(),
    };

    tracing::info!(
        user_id = admin.user_id,
        rule_id = published.rule.id,
        form_type = %published.rule.form_type,
        program_id = ?published.rule.program_id,
        version = published.rule.version,
        step_count = published.steps.len(),
        "Workflow rule published"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: published })))
}
