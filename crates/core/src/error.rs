//! Error taxonomy for the clearance workflow engine.
//!
//! Every variant is local to a single request's transition. Callers decide
//! whether to retry; the engine never retries on its own.

use crate::form_type::FormType;
use crate::status::ClearanceStatus;
use crate::types::DbId;

/// Failure of a resolver, guard, or transition operation.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// No active rule matches the submission's `(form_type, program_id)`.
    #[error("No workflow defined for form type {form_type} and program {program_id:?}")]
    NoWorkflowDefined {
        form_type: FormType,
        program_id: Option<DbId>,
    },

    /// The request's current step lies outside its resolved workflow.
    #[error("Step {current_step} is out of range for a workflow with {step_count} steps")]
    StepIndexOutOfRange { current_step: i32, step_count: usize },

    /// The acting approver does not belong to the office bound to the current step.
    #[error("Office {actual_office_id:?} may not act on step {step_order}; it is bound to office {expected_office_id}")]
    WrongOffice {
        step_order: i32,
        expected_office_id: DbId,
        actual_office_id: Option<DbId>,
    },

    #[error("A rejection requires a non-empty reason")]
    MissingRejectionReason,

    /// Another transition committed first; re-read the request and retry.
    #[error("Clearance request {request_id} was modified concurrently")]
    ConcurrentTransitionConflict { request_id: DbId },

    /// The request's lifecycle status does not permit the operation.
    #[error("Cannot {operation} clearance request {request_id} while it is {status}")]
    InvalidStatus {
        request_id: DbId,
        status: ClearanceStatus,
        operation: &'static str,
    },

    #[error("User {user_id} is not the requester of clearance request {request_id}")]
    NotRequester { request_id: DbId, user_id: DbId },

    /// The stored steps of a rule violate the contiguous `1..N` ordering.
    #[error("Workflow rule {rule_id} is malformed: {reason}")]
    InvalidWorkflow { rule_id: DbId, reason: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Failure reported by a [`ClearanceStore`](crate::store::ClearanceStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The compare-and-swap on the request's version counter matched no row.
    #[error("Version conflict on clearance request {request_id}")]
    VersionConflict { request_id: DbId },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict { request_id } => {
                WorkflowError::ConcurrentTransitionConflict { request_id }
            }
            StoreError::Backend(msg) => WorkflowError::Storage(msg),
        }
    }
}
