//! Workflow catalog domain types.
//!
//! A [`WorkflowRule`] version is immutable once published: editing a rule
//! publishes a new version and deactivates the old one, so requests that
//! captured the old `workflow_rule_id` keep resolving against the same steps.

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::form_type::FormType;
use crate::types::{DbId, Timestamp};

/// One published version of the approval chain for a `(form_type, program_id)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRule {
    pub id: DbId,
    pub form_type: FormType,
    /// `None` marks a program-agnostic rule (staff clearance).
    pub program_id: Option<DbId>,
    pub version: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// One ordered stage of a rule, bound to exactly one office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: DbId,
    pub workflow_rule_id: DbId,
    /// 1-based position within the rule.
    pub step_order: i32,
    pub office_id: DbId,
}

/// Sort steps by `step_order` and verify the orders are exactly `1..=N`.
pub fn order_steps(
    rule_id: DbId,
    mut steps: Vec<WorkflowStep>,
) -> Result<Vec<WorkflowStep>, WorkflowError> {
    steps.sort_by_key(|s| s.step_order);

    for (index, step) in steps.iter().enumerate() {
        if step.workflow_rule_id != rule_id {
            return Err(WorkflowError::InvalidWorkflow {
                rule_id,
                reason: format!("step {} belongs to rule {}", step.id, step.workflow_rule_id),
            });
        }
        let expected = index as i32 + 1;
        if step.step_order != expected {
            return Err(WorkflowError::InvalidWorkflow {
                rule_id,
                reason: format!(
                    "expected step_order {expected}, found {}",
                    step.step_order
                ),
            });
        }
    }

    Ok(steps)
}

/// Validate the office chain of a rule about to be published.
pub fn validate_office_chain(office_ids: &[DbId]) -> Result<(), WorkflowError> {
    if office_ids.is_empty() {
        return Err(WorkflowError::Validation(
            "A workflow rule needs at least one step".to_string(),
        ));
    }
    for (pos, office_id) in office_ids.iter().enumerate() {
        if let Some(first) = office_ids[..pos].iter().position(|id| id == office_id) {
            return Err(WorkflowError::Validation(format!(
                "Steps {} and {} are bound to the same office {}",
                first + 1,
                pos + 1,
                office_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn step(id: DbId, order: i32, office_id: DbId) -> WorkflowStep {
        WorkflowStep {
            id,
            workflow_rule_id: 1,
            step_order: order,
            office_id,
        }
    }

    #[test]
    fn orders_steps_by_step_order() {
        let steps = order_steps(1, vec![step(2, 2, 20), step(1, 1, 10), step(3, 3, 30)]).unwrap();
        let offices: Vec<DbId> = steps.iter().map(|s| s.office_id).collect();
        assert_eq!(offices, vec![10, 20, 30]);
    }

    #[test]
    fn gap_in_orders_is_malformed() {
        let result = order_steps(1, vec![step(1, 1, 10), step(2, 3, 20)]);
        assert_matches!(result, Err(WorkflowError::InvalidWorkflow { rule_id: 1, .. }));
    }

    #[test]
    fn duplicate_orders_are_malformed() {
        let result = order_steps(1, vec![step(1, 1, 10), step(2, 1, 20)]);
        assert_matches!(result, Err(WorkflowError::InvalidWorkflow { .. }));
    }

    #[test]
    fn foreign_step_is_malformed() {
        let mut foreign = step(2, 2, 20);
        foreign.workflow_rule_id = 7;
        let result = order_steps(1, vec![step(1, 1, 10), foreign]);
        assert_matches!(result, Err(WorkflowError::InvalidWorkflow { .. }));
    }

    #[test]
    fn empty_office_chain_rejected() {
        assert_matches!(validate_office_chain(&[]), Err(WorkflowError::Validation(_)));
    }

    #[test]
    fn repeated_office_rejected_anywhere_in_chain() {
        assert_matches!(validate_office_chain(&[1, 2, 2]), Err(WorkflowError::Validation(_)));
        let err = validate_office_chain(&[1, 2, 1]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Steps 1 and 3 are bound to the same office 1"
        );
        assert!(validate_office_chain(&[1, 2, 3]).is_ok());
    }
}
