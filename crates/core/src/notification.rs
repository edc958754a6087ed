//! Notification routing for committed transitions.
//!
//! [`route`] maps a [`TransitionOutcome`] and the approvers of the office
//! that must act next to a list of [`NotificationIntent`]s. Delivery is the
//! sink's concern; nothing here performs I/O.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::transition::TransitionOutcome;
use crate::types::DbId;

/// Why a recipient is being notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Submitted,
    Advanced,
    Completed,
    Rejected,
    Resubmitted,
    /// Sent to every approver of the office that now owns the current step.
    StepAssigned,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Submitted => "submitted",
            NotificationKind::Advanced => "advanced",
            NotificationKind::Completed => "completed",
            NotificationKind::Rejected => "rejected",
            NotificationKind::Resubmitted => "resubmitted",
            NotificationKind::StepAssigned => "step_assigned",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to inform one user about one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationIntent {
    pub recipient_user_id: DbId,
    pub request_id: DbId,
    pub kind: NotificationKind,
    pub payload: serde_json::Value,
}

/// Compute notification intents for a committed transition.
///
/// `office_approvers` are the approvers of `outcome.next_office()`; they are
/// ignored for outcomes that end the workflow. Duplicate approver ids and
/// the requester are filtered out of the office fan-out.
pub fn route(outcome: &TransitionOutcome, office_approvers: &[DbId]) -> Vec<NotificationIntent> {
    let request_id = outcome.request_id();
    let requester_id = outcome.requester_id();

    let (kind, payload) = match outcome {
        TransitionOutcome::Submitted { office_id, .. } => (
            NotificationKind::Submitted,
            json!({ "current_step": 1, "office_id": office_id }),
        ),
        TransitionOutcome::Advanced {
            step_order,
            office_id,
            ..
        } => (
            NotificationKind::Advanced,
            json!({ "current_step": step_order, "office_id": office_id }),
        ),
        TransitionOutcome::Completed { .. } => (NotificationKind::Completed, json!({})),
        TransitionOutcome::Rejected {
            step_order, reason, ..
        } => (
            NotificationKind::Rejected,
            json!({ "step_order": step_order, "reason": reason }),
        ),
        TransitionOutcome::Resubmitted {
            office_id,
            resubmission_count,
            ..
        } => (
            NotificationKind::Resubmitted,
            json!({
                "current_step": 1,
                "office_id": office_id,
                "resubmission_count": resubmission_count,
            }),
        ),
    };

    let mut intents = vec![NotificationIntent {
        recipient_user_id: requester_id,
        request_id,
        kind,
        payload,
    }];

    if let Some(office_id) = outcome.next_office() {
        let step_order = match outcome {
            TransitionOutcome::Advanced { step_order, .. } => *step_order,
            _ => 1,
        };
        let recipients: BTreeSet<DbId> = office_approvers
            .iter()
            .copied()
            .filter(|id| *id != requester_id)
            .collect();
        intents.extend(recipients.into_iter().map(|approver_id| NotificationIntent {
            recipient_user_id: approver_id,
            request_id,
            kind: NotificationKind::StepAssigned,
            payload: json!({ "step_order": step_order, "office_id": office_id }),
        }));
    }

    intents
}
