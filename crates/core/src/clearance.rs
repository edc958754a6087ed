//! Clearance request and approval action domain types.

use serde::{Deserialize, Serialize};

use crate::form_type::FormType;
use crate::status::{ActionStatus, ClearanceStatus};
use crate::types::{DbId, Timestamp};

/// A single requester's clearance case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearanceRequest {
    pub id: DbId,
    pub requester_id: DbId,
    pub form_type: FormType,
    pub program_id: Option<DbId>,
    /// Rule version captured at submission.
    pub workflow_rule_id: DbId,
    pub status: ClearanceStatus,
    /// 1-based index into the resolved steps; `N + 1` once completed.
    pub current_step: i32,
    pub rejection_reason: Option<String>,
    pub resubmission_count: i32,
    /// Optimistic-concurrency counter, bumped by every committed transition.
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for inserting a freshly submitted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClearanceRequest {
    pub requester_id: DbId,
    pub form_type: FormType,
    pub program_id: Option<DbId>,
    pub workflow_rule_id: DbId,
}

/// Immutable audit record of one approver's decision at one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalAction {
    pub id: DbId,
    pub clearance_request_id: DbId,
    pub approver_id: DbId,
    pub office_id: DbId,
    pub step_order: i32,
    /// Equals the request's `resubmission_count` at decision time.
    pub resubmission_round: i32,
    pub status: ActionStatus,
    pub comment: Option<String>,
    pub action_date: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// An approval action about to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApprovalAction {
    pub clearance_request_id: DbId,
    pub approver_id: DbId,
    pub office_id: DbId,
    pub step_order: i32,
    pub resubmission_round: i32,
    pub status: ActionStatus,
    pub comment: Option<String>,
    pub action_date: Timestamp,
}

/// Caller-supplied identity, already authenticated upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    /// Set for approvers; `None` for requesters and unassigned users.
    pub office_id: Option<DbId>,
}

impl Actor {
    pub fn requester(user_id: DbId) -> Self {
        Self {
            user_id,
            office_id: None,
        }
    }

    pub fn approver(user_id: DbId, office_id: DbId) -> Self {
        Self {
            user_id,
            office_id: Some(office_id),
        }
    }
}

/// Trim a free-text comment, mapping blank input to `None`.
pub fn normalize_comment(comment: Option<&str>) -> Option<String> {
    comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}
