//! Workflow resolution: which ordered offices apply to a request.
//!
//! Resolution is a pure read against the catalog and is safe to call
//! concurrently. A program-agnostic rule (`program_id IS NULL`) is matched
//! only when the request itself carries no program.

use serde::Serialize;

use crate::error::WorkflowError;
use crate::form_type::FormType;
use crate::store::ClearanceStore;
use crate::types::DbId;
use crate::workflow::{order_steps, WorkflowRule, WorkflowStep};

/// A rule version together with its steps sorted by `step_order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedWorkflow {
    pub rule: WorkflowRule,
    pub steps: Vec<WorkflowStep>,
}

impl ResolvedWorkflow {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn office_ids(&self) -> Vec<DbId> {
        self.steps.iter().map(|s| s.office_id).collect()
    }
}

/// Resolve the active workflow for a new submission.
///
/// Fails with [`WorkflowError::NoWorkflowDefined`] when no active rule
/// matches or the matched rule has no steps.
pub async fn resolve<S>(
    store: &S,
    form_type: FormType,
    program_id: Option<DbId>,
) -> Result<ResolvedWorkflow, WorkflowError>
where
    S: ClearanceStore + ?Sized,
{
    let no_workflow = || WorkflowError::NoWorkflowDefined {
        form_type,
        program_id,
    };

    let rule = store
        .find_active_rule(form_type, program_id)
        .await?
        .ok_or_else(no_workflow)?;

    let steps = order_steps(rule.id, store.list_steps(rule.id).await?)?;
    if steps.is_empty() {
        return Err(no_workflow());
    }

    Ok(ResolvedWorkflow { rule, steps })
}

/// Load the ordered steps of a specific rule version.
///
/// In-flight requests use this with the `workflow_rule_id` captured at
/// submission, so later catalog edits never reorder their steps.
pub async fn resolve_rule<S>(store: &S, rule_id: DbId) -> Result<Vec<WorkflowStep>, WorkflowError>
where
    S: ClearanceStore + ?Sized,
{
    order_steps(rule_id, store.list_steps(rule_id).await?)
}
