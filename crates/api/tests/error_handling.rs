//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly; no server or database is needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use clearance_api::error::AppError;
use clearance_core::error::{StoreError, WorkflowError};
use clearance_core::form_type::FormType;
use clearance_core::status::ClearanceStatus;
use http_body_util::BodyExt;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn no_workflow_defined_returns_422() {
    let err = AppError::from(WorkflowError::NoWorkflowDefined {
        form_type: FormType::IdReplacement,
        program_id: Some(3),
    });
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "NO_WORKFLOW_DEFINED");
}

#[tokio::test]
async fn wrong_office_returns_403() {
    let err = AppError::from(WorkflowError::WrongOffice {
        step_order: 1,
        expected_office_id: 10,
        actual_office_id: Some(20),
    });
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "WRONG_OFFICE");
}

#[tokio::test]
async fn missing_rejection_reason_returns_400() {
    let (status, json) = error_to_response(WorkflowError::MissingRejectionReason.into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MISSING_REJECTION_REASON");
}

#[tokio::test]
async fn version_conflict_returns_409() {
    let err = AppError::from(StoreError::VersionConflict { request_id: 5 });
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONCURRENT_TRANSITION_CONFLICT");
}

#[tokio::test]
async fn step_out_of_range_and_invalid_status_return_409() {
    let (status, json) = error_to_response(
        WorkflowError::StepIndexOutOfRange {
            current_step: 4,
            step_count: 2,
        }
        .into(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "STEP_INDEX_OUT_OF_RANGE");

    let (status, json) = error_to_response(
        WorkflowError::InvalidStatus {
            request_id: 1,
            status: ClearanceStatus::Completed,
            operation: "approve",
        }
        .into(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "INVALID_STATUS");
}

#[tokio::test]
async fn not_found_returns_404_with_entity() {
    let err = AppError::from(WorkflowError::NotFound {
        entity: "ClearanceRequest",
        id: 42,
    });
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "ClearanceRequest with id 42 not found");
}

#[tokio::test]
async fn storage_failures_are_sanitized() {
    let err = AppError::from(StoreError::Backend("connection refused to 10.0.0.3".into()));
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}
