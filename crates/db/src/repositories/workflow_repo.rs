//! Repository for the `workflow_rules` and `workflow_steps` tables.

use clearance_core::form_type::FormType;
use clearance_core::types::DbId;
use sqlx::PgPool;

use crate::models::workflow::{PublishWorkflowRule, WorkflowRuleRow, WorkflowStepRow};

/// Column list for workflow_rules queries.
const RULE_COLUMNS: &str = "id, form_type, program_id, version, is_active, created_by, created_at";

/// Column list for workflow_steps queries.
const STEP_COLUMNS: &str = "id, workflow_rule_id, step_order, office_id";

/// Provides catalog reads and versioned publishing for workflow rules.
pub struct WorkflowRepo;

impl WorkflowRepo {
    /// Find the active rule for an exact `(form_type, program_id)` pair.
    ///
    /// A `NULL` program only matches a `NULL` program.
    pub async fn find_active(
        pool: &PgPool,
        form_type: FormType,
        program_id: Option<DbId>,
    ) -> Result<Option<WorkflowRuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {RULE_COLUMNS} FROM workflow_rules
             WHERE form_type = $1
               AND program_id IS NOT DISTINCT FROM $2
               AND is_active"
        );
        sqlx::query_as::<_, WorkflowRuleRow>(&query)
            .bind(form_type.as_str())
            .bind(program_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a rule version by its ID, active or not.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WorkflowRuleRow>, sqlx::Error> {
        let query = format!("SELECT {RULE_COLUMNS} FROM workflow_rules WHERE id = $1");
        sqlx::query_as::<_, WorkflowRuleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all active rules, ordered by form type then program.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<WorkflowRuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {RULE_COLUMNS} FROM workflow_rules
             WHERE is_active
             ORDER BY form_type ASC, program_id ASC NULLS FIRST"
        );
        sqlx::query_as::<_, WorkflowRuleRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// List the steps of a rule version ordered by `step_order`.
    pub async fn list_steps(
        pool: &PgPool,
        rule_id: DbId,
    ) -> Result<Vec<WorkflowStepRow>, sqlx::Error> {
        let query = format!(
            "SELECT {STEP_COLUMNS} FROM workflow_steps
             WHERE workflow_rule_id = $1
             ORDER BY step_order ASC"
        );
        sqlx::query_as::<_, WorkflowStepRow>(&query)
            .bind(rule_id)
            .fetch_all(pool)
            .await
    }

    /// Publish a new rule version with one step per office, in order.
    ///
    /// The previously active version for the same pair is deactivated in the
    /// same transaction; its steps are left untouched so in-flight requests
    /// keep resolving against them. Callers validate `office_ids` first.
    pub async fn publish(
        pool: &PgPool,
        input: &PublishWorkflowRule,
        created_by: Option<DbId>,
    ) -> Result<(WorkflowRuleRow, Vec<WorkflowStepRow>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Serialize concurrent publishes of the same pair on its existing versions.
        sqlx::query(
            "SELECT id FROM workflow_rules
             WHERE form_type = $1 AND program_id IS NOT DISTINCT FROM $2
             FOR UPDATE",
        )
        .bind(input.form_type.as_str())
        .bind(input.program_id)
        .execute(&mut *tx)
        .await?;

        let next_version: (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM workflow_rules
             WHERE form_type = $1 AND program_id IS NOT DISTINCT FROM $2",
        )
        .bind(input.form_type.as_str())
        .bind(input.program_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE workflow_rules SET is_active = false
             WHERE form_type = $1 AND program_id IS NOT DISTINCT FROM $2 AND is_active",
        )
        .bind(input.form_type.as_str())
        .bind(input.program_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO workflow_rules (form_type, program_id, version, is_active, created_by)
             VALUES ($1, $2, $3, true, $4)
             RETURNING {RULE_COLUMNS}"
        );
        let rule = sqlx::query_as::<_, WorkflowRuleRow>(&query)
            .bind(input.form_type.as_str())
            .bind(input.program_id)
            .bind(next_version.0)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        let step_query = format!(
            "INSERT INTO workflow_steps (workflow_rule_id, step_order, office_id)
             VALUES ($1, $2, $3)
             RETURNING {STEP_COLUMNS}"
        );
        let mut steps = Vec::with_capacity(input.office_ids.len());
        for (index, office_id) in input.office_ids.iter().enumerate() {
            let step = sqlx::query_as::<_, WorkflowStepRow>(&step_query)
                .bind(rule.id)
                .bind(index as i32 + 1)
                .bind(office_id)
                .fetch_one(&mut *tx)
                .await?;
            steps.push(step);
        }

        tx.commit().await?;
        Ok((rule, steps))
    }
}
