//! Clearance request and approval action models.

use clearance_core::clearance::{ApprovalAction, ClearanceRequest};
use clearance_core::error::StoreError;
use clearance_core::form_type::FormType;
use clearance_core::status::{ActionStatus, ClearanceStatus, StatusId};
use clearance_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::corrupt_row;

/// A row from the `clearance_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClearanceRequestRow {
    pub id: DbId,
    pub requester_id: DbId,
    pub form_type: String,
    pub program_id: Option<DbId>,
    pub workflow_rule_id: DbId,
    pub status_id: StatusId,
    pub current_step: i32,
    pub rejection_reason: Option<String>,
    pub resubmission_count: i32,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ClearanceRequestRow {
    pub fn into_domain(self) -> Result<ClearanceRequest, StoreError> {
        let form_type: FormType = self
            .form_type
            .parse()
            .map_err(|e| corrupt_row("clearance_requests", self.id, e))?;
        let status = ClearanceStatus::from_id(self.status_id).ok_or_else(|| {
            corrupt_row(
                "clearance_requests",
                self.id,
                format!("unknown status_id {}", self.status_id),
            )
        })?;
        Ok(ClearanceRequest {
            id: self.id,
            requester_id: self.requester_id,
            form_type,
            program_id: self.program_id,
            workflow_rule_id: self.workflow_rule_id,
            status,
            current_step: self.current_step,
            rejection_reason: self.rejection_reason,
            resubmission_count: self.resubmission_count,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// A row from the `approval_actions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApprovalActionRow {
    pub id: DbId,
    pub clearance_request_id: DbId,
    pub approver_id: DbId,
    pub office_id: DbId,
    pub step_order: i32,
    pub resubmission_round: i32,
    pub status_id: StatusId,
    pub comment: Option<String>,
    pub action_date: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl ApprovalActionRow {
    pub fn into_domain(self) -> Result<ApprovalAction, StoreError> {
        let status = ActionStatus::from_id(self.status_id).ok_or_else(|| {
            corrupt_row(
                "approval_actions",
                self.id,
                format!("unknown status_id {}", self.status_id),
            )
        })?;
        Ok(ApprovalAction {
            id: self.id,
            clearance_request_id: self.clearance_request_id,
            approver_id: self.approver_id,
            office_id: self.office_id,
            step_order: self.step_order,
            resubmission_round: self.resubmission_round,
            status,
            comment: self.comment,
            action_date: self.action_date,
            created_at: self.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Body of `POST /clearances`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitClearanceRequest {
    pub form_type: FormType,
    #[serde(default)]
    pub program_id: Option<DbId>,
}

/// Body of an approve or reject call.
///
/// `expected_version` is the request version the caller last read; a
/// mismatch fails with a concurrency conflict instead of acting on stale state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecisionRequest {
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub expected_version: Option<i32>,
}

/// Body of `POST /clearances/{id}/resubmit`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResubmitRequest {
    #[serde(default)]
    pub expected_version: Option<i32>,
}
