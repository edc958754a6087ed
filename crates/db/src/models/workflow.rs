//! Workflow catalog models and DTOs.

use clearance_core::error::StoreError;
use clearance_core::form_type::FormType;
use clearance_core::types::{DbId, Timestamp};
use clearance_core::workflow::{WorkflowRule, WorkflowStep};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::corrupt_row;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A row from the `workflow_rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowRuleRow {
    pub id: DbId,
    pub form_type: String,
    pub program_id: Option<DbId>,
    pub version: i32,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

impl WorkflowRuleRow {
    pub fn into_domain(self) -> Result<WorkflowRule, StoreError> {
        let form_type: FormType = self
            .form_type
            .parse()
            .map_err(|e| corrupt_row("workflow_rules", self.id, e))?;
        Ok(WorkflowRule {
            id: self.id,
            form_type,
            program_id: self.program_id,
            version: self.version,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

/// A row from the `workflow_steps` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowStepRow {
    pub id: DbId,
    pub workflow_rule_id: DbId,
    pub step_order: i32,
    pub office_id: DbId,
}

impl From<WorkflowStepRow> for WorkflowStep {
    fn from(row: WorkflowStepRow) -> Self {
        WorkflowStep {
            id: row.id,
            workflow_rule_id: row.workflow_rule_id,
            step_order: row.step_order,
            office_id: row.office_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for publishing a new rule version: one office per step, in order.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishWorkflowRule {
    pub form_type: FormType,
    pub program_id: Option<DbId>,
    pub office_ids: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// A rule version together with its ordered steps.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRuleWithSteps {
    pub rule: WorkflowRule,
    pub steps: Vec<WorkflowStep>,
}
