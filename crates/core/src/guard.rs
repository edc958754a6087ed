//! Step authorization guard.
//!
//! Decides whether an acting approver's office may act on a request's
//! *current* step. Approvers bound to past or future steps are refused
//! regardless of role. Evaluated fresh on every action attempt.

use crate::clearance::ClearanceRequest;
use crate::error::WorkflowError;
use crate::types::DbId;
use crate::workflow::WorkflowStep;

/// Authorize `acting_office_id` against the request's current step.
///
/// Returns the step being acted on.
pub fn authorize<'a>(
    request: &ClearanceRequest,
    steps: &'a [WorkflowStep],
    acting_office_id: Option<DbId>,
) -> Result<&'a WorkflowStep, WorkflowError> {
    let step = current_step(request, steps)?;

    if acting_office_id != Some(step.office_id) {
        return Err(WorkflowError::WrongOffice {
            step_order: step.step_order,
            expected_office_id: step.office_id,
            actual_office_id: acting_office_id,
        });
    }

    Ok(step)
}

/// Look up the step at `request.current_step` (1-based).
pub fn current_step<'a>(
    request: &ClearanceRequest,
    steps: &'a [WorkflowStep],
) -> Result<&'a WorkflowStep, WorkflowError> {
    let out_of_range = || WorkflowError::StepIndexOutOfRange {
        current_step: request.current_step,
        step_count: steps.len(),
    };

    let index = usize::try_from(request.current_step - 1).map_err(|_| out_of_range())?;
    steps.get(index).ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_type::FormType;
    use crate::status::ClearanceStatus;
    use assert_matches::assert_matches;

    const OFFICE_A: DbId = 10;
    const OFFICE_B: DbId = 20;

    fn steps() -> Vec<WorkflowStep> {
        vec![
            WorkflowStep {
                id: 1,
                workflow_rule_id: 1,
                step_order: 1,
                office_id: OFFICE_A,
            },
            WorkflowStep {
                id: 2,
                workflow_rule_id: 1,
                step_order: 2,
                office_id: OFFICE_B,
            },
        ]
    }

    fn request_at(current_step: i32) -> ClearanceRequest {
        let now = chrono::Utc::now();
        ClearanceRequest {
            id: 1,
            requester_id: 100,
            form_type: FormType::Termination,
            program_id: Some(1),
            workflow_rule_id: 1,
            status: ClearanceStatus::Pending,
            current_step,
            rejection_reason: None,
            resubmission_count: 0,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn bound_office_is_authorized() {
        let steps = steps();
        let step = authorize(&request_at(1), &steps, Some(OFFICE_A)).unwrap();
        assert_eq!(step.step_order, 1);
    }

    #[test]
    fn future_step_office_is_refused() {
        let steps = steps();
        let result = authorize(&request_at(1), &steps, Some(OFFICE_B));
        assert_matches!(
            result,
            Err(WorkflowError::WrongOffice {
                step_order: 1,
                expected_office_id: OFFICE_A,
                actual_office_id: Some(OFFICE_B),
            })
        );
    }

    #[test]
    fn past_step_office_is_refused() {
        let steps = steps();
        let result = authorize(&request_at(2), &steps, Some(OFFICE_A));
        assert_matches!(result, Err(WorkflowError::WrongOffice { step_order: 2, .. }));
    }

    #[test]
    fn actor_without_office_is_refused() {
        let steps = steps();
        let result = authorize(&request_at(1), &steps, None);
        assert_matches!(result, Err(WorkflowError::WrongOffice { actual_office_id: None, .. }));
    }

    #[test]
    fn completed_request_is_out_of_range() {
        let steps = steps();
        let result = authorize(&request_at(3), &steps, Some(OFFICE_B));
        assert_matches!(
            result,
            Err(WorkflowError::StepIndexOutOfRange {
                current_step: 3,
                step_count: 2,
            })
        );
    }

    #[test]
    fn zero_step_is_out_of_range() {
        let steps = steps();
        let result = authorize(&request_at(0), &steps, Some(OFFICE_A));
        assert_matches!(result, Err(WorkflowError::StepIndexOutOfRange { .. }));
    }
}
