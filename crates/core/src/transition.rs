//! The clearance lifecycle state machine.
//!
//! [`apply`] is a pure function: given the current request, its resolved
//! steps, and a command, it computes the next request state, the approval
//! action to append (if any), and a typed [`TransitionOutcome`]. Nothing is
//! written here; the engine commits the result atomically through the store.
//!
//! ```text
//! PENDING(i) --approve, i < N--> PENDING(i+1)
//! PENDING(N) --approve--------> COMPLETED
//! PENDING(i) --reject---------> REJECTED
//! REJECTED   --resubmit-------> RESUBMITTED --> PENDING(1)
//! ```

use serde::Serialize;

use crate::clearance::{normalize_comment, Actor, ClearanceRequest, NewApprovalAction};
use crate::error::WorkflowError;
use crate::guard;
use crate::status::{ActionStatus, ClearanceStatus};
use crate::types::{DbId, Timestamp};
use crate::workflow::WorkflowStep;

/// An operation on an existing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Approve {
        approver: Actor,
        comment: Option<String>,
    },
    Reject {
        approver: Actor,
        comment: Option<String>,
    },
    Resubmit {
        requester: Actor,
    },
}

impl Command {
    /// Verb used in logs and `InvalidStatus` errors.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Approve { .. } => "approve",
            Command::Reject { .. } => "reject",
            Command::Resubmit { .. } => "resubmit",
        }
    }
}

/// What a committed transition did, as consumed by the notification router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// New request waiting on the office at step 1.
    Submitted {
        request_id: DbId,
        requester_id: DbId,
        office_id: DbId,
    },
    /// A step was approved; `step_order` / `office_id` describe the new current step.
    Advanced {
        request_id: DbId,
        requester_id: DbId,
        step_order: i32,
        office_id: DbId,
    },
    /// The final step was approved.
    Completed {
        request_id: DbId,
        requester_id: DbId,
    },
    Rejected {
        request_id: DbId,
        requester_id: DbId,
        step_order: i32,
        reason: String,
    },
    /// Back at step 1 after a rejection.
    Resubmitted {
        request_id: DbId,
        requester_id: DbId,
        office_id: DbId,
        resubmission_count: i32,
    },
}

impl TransitionOutcome {
    pub fn request_id(&self) -> DbId {
        match self {
            TransitionOutcome::Submitted { request_id, .. }
            | TransitionOutcome::Advanced { request_id, .. }
            | TransitionOutcome::Completed { request_id, .. }
            | TransitionOutcome::Rejected { request_id, .. }
            | TransitionOutcome::Resubmitted { request_id, .. } => *request_id,
        }
    }

    pub fn requester_id(&self) -> DbId {
        match self {
            TransitionOutcome::Submitted { requester_id, .. }
            | TransitionOutcome::Advanced { requester_id, .. }
            | TransitionOutcome::Completed { requester_id, .. }
            | TransitionOutcome::Rejected { requester_id, .. }
            | TransitionOutcome::Resubmitted { requester_id, .. } => *requester_id,
        }
    }

    /// The office whose approvers must now act, if the workflow continues.
    pub fn next_office(&self) -> Option<DbId> {
        match self {
            TransitionOutcome::Submitted { office_id, .. }
            | TransitionOutcome::Advanced { office_id, .. }
            | TransitionOutcome::Resubmitted { office_id, .. } => Some(*office_id),
            TransitionOutcome::Completed { .. } | TransitionOutcome::Rejected { .. } => None,
        }
    }
}

/// The computed effect of a command, not yet committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Request state to write. `version` still holds the value that was read.
    pub next: ClearanceRequest,
    pub action: Option<NewApprovalAction>,
    pub outcome: TransitionOutcome,
}

/// Outcome for a request that was just inserted at step 1.
pub fn submitted(
    request: &ClearanceRequest,
    steps: &[WorkflowStep],
) -> Result<TransitionOutcome, WorkflowError> {
    let first = guard::current_step(request, steps)?;
    Ok(TransitionOutcome::Submitted {
        request_id: request.id,
        requester_id: request.requester_id,
        office_id: first.office_id,
    })
}

/// Compute the transition for `command` against `request`.
///
/// `steps` must be the ordered steps of `request.workflow_rule_id`.
pub fn apply(
    request: &ClearanceRequest,
    steps: &[WorkflowStep],
    command: &Command,
    now: Timestamp,
) -> Result<Transition, WorkflowError> {
    match command {
        Command::Approve { approver, comment } => approve(request, steps, approver, comment, now),
        Command::Reject { approver, comment } => reject(request, steps, approver, comment, now),
        Command::Resubmit { requester } => resubmit(request, steps, requester, now),
    }
}

fn approve(
    request: &ClearanceRequest,
    steps: &[WorkflowStep],
    approver: &Actor,
    comment: &Option<String>,
    now: Timestamp,
) -> Result<Transition, WorkflowError> {
    let step = guard::authorize(request, steps, approver.office_id)?;
    require_status(request, ClearanceStatus::Pending, "approve")?;

    let action = decision(request, step, approver, ActionStatus::Approved, comment, now);
    let mut next = request.clone();
    next.updated_at = now;

    let is_last = step.step_order as usize == steps.len();
    let outcome = if is_last {
        move_to(&mut next, ClearanceStatus::Completed)?;
        next.current_step = step.step_order + 1;
        TransitionOutcome::Completed {
            request_id: request.id,
            requester_id: request.requester_id,
        }
    } else {
        move_to(&mut next, ClearanceStatus::Pending)?;
        next.current_step = step.step_order + 1;
        let upcoming = guard::current_step(&next, steps)?;
        TransitionOutcome::Advanced {
            request_id: request.id,
            requester_id: request.requester_id,
            step_order: upcoming.step_order,
            office_id: upcoming.office_id,
        }
    };

    Ok(Transition {
        next,
        action: Some(action),
        outcome,
    })
}

fn reject(
    request: &ClearanceRequest,
    steps: &[WorkflowStep],
    approver: &Actor,
    comment: &Option<String>,
    now: Timestamp,
) -> Result<Transition, WorkflowError> {
    let reason =
        normalize_comment(comment.as_deref()).ok_or(WorkflowError::MissingRejectionReason)?;
    let step = guard::authorize(request, steps, approver.office_id)?;
    require_status(request, ClearanceStatus::Pending, "reject")?;

    let action = decision(
        request,
        step,
        approver,
        ActionStatus::Rejected,
        &Some(reason.clone()),
        now,
    );
    let mut next = request.clone();
    next.updated_at = now;
    move_to(&mut next, ClearanceStatus::Rejected)?;
    next.rejection_reason = Some(reason.clone());

    Ok(Transition {
        next,
        action: Some(action),
        outcome: TransitionOutcome::Rejected {
            request_id: request.id,
            requester_id: request.requester_id,
            step_order: step.step_order,
            reason,
        },
    })
}

fn resubmit(
    request: &ClearanceRequest,
    steps: &[WorkflowStep],
    requester: &Actor,
    now: Timestamp,
) -> Result<Transition, WorkflowError> {
    if requester.user_id != request.requester_id {
        return Err(WorkflowError::NotRequester {
            request_id: request.id,
            user_id: requester.user_id,
        });
    }
    require_status(request, ClearanceStatus::Rejected, "resubmit")?;

    let mut next = request.clone();
    next.updated_at = now;
    move_to(&mut next, ClearanceStatus::Resubmitted)?;
    move_to(&mut next, ClearanceStatus::Pending)?;
    next.current_step = 1;
    next.resubmission_count += 1;
    next.rejection_reason = None;

    let first = guard::current_step(&next, steps)?;

    Ok(Transition {
        outcome: TransitionOutcome::Resubmitted {
            request_id: request.id,
            requester_id: request.requester_id,
            office_id: first.office_id,
            resubmission_count: next.resubmission_count,
        },
        next,
        action: None,
    })
}

fn require_status(
    request: &ClearanceRequest,
    expected: ClearanceStatus,
    operation: &'static str,
) -> Result<(), WorkflowError> {
    if request.status != expected {
        return Err(WorkflowError::InvalidStatus {
            request_id: request.id,
            status: request.status,
            operation,
        });
    }
    Ok(())
}

fn move_to(request: &mut ClearanceRequest, status: ClearanceStatus) -> Result<(), WorkflowError> {
    if !request.status.can_transition_to(status) {
        return Err(WorkflowError::InvalidStatus {
            request_id: request.id,
            status: request.status,
            operation: "transition",
        });
    }
    request.status = status;
    Ok(())
}

fn decision(
    request: &ClearanceRequest,
    step: &WorkflowStep,
    approver: &Actor,
    status: ActionStatus,
    comment: &Option<String>,
    now: Timestamp,
) -> NewApprovalAction {
    NewApprovalAction {
        clearance_request_id: request.id,
        approver_id: approver.user_id,
        office_id: step.office_id,
        step_order: step.step_order,
        resubmission_round: request.resubmission_count,
        status,
        comment: normalize_comment(comment.as_deref()),
        action_date: now,
    }
}
