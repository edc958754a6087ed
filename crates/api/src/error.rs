use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clearance_core::error::{StoreError, WorkflowError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`WorkflowError`] for domain failures and adds HTTP-specific
/// variants. Renders as `{ "error": ..., "code": ... }` JSON.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A workflow failure from `clearance_core`.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Workflow(err.into())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Workflow(err) => classify_workflow_error(err),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a workflow failure to an HTTP status, error code, and message.
fn classify_workflow_error(err: &WorkflowError) -> (StatusCode, &'static str, String) {
    let (status, code) = match err {
        WorkflowError::NoWorkflowDefined { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "NO_WORKFLOW_DEFINED")
        }
        WorkflowError::StepIndexOutOfRange { .. } => {
            (StatusCode::CONFLICT, "STEP_INDEX_OUT_OF_RANGE")
        }
        WorkflowError::WrongOffice { .. } => (StatusCode::FORBIDDEN, "WRONG_OFFICE"),
        WorkflowError::MissingRejectionReason => {
            (StatusCode::BAD_REQUEST, "MISSING_REJECTION_REASON")
        }
        WorkflowError::ConcurrentTransitionConflict { .. } => {
            (StatusCode::CONFLICT, "CONCURRENT_TRANSITION_CONFLICT")
        }
        WorkflowError::InvalidStatus { .. } => (StatusCode::CONFLICT, "INVALID_STATUS"),
        WorkflowError::NotRequester { .. } => (StatusCode::FORBIDDEN, "NOT_REQUESTER"),
        WorkflowError::Validation(msg) => {
            return (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone());
        }
        WorkflowError::NotFound { entity, id } => {
            return (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            );
        }
        WorkflowError::InvalidWorkflow { .. } | WorkflowError::Storage(_) => {
            tracing::error!(error = %err, "Workflow storage failure");
            return internal();
        }
    };
    (status, code, err.to_string())
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on a `uq_*` constraint map to 409.
/// - Foreign key violations map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if db_err.is_unique_violation() && constraint.starts_with("uq_") {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
            if db_err.is_foreign_key_violation() {
                return (
                    StatusCode::BAD_REQUEST,
                    "BAD_REQUEST",
                    format!("Referenced entity does not exist: {constraint}"),
                );
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
