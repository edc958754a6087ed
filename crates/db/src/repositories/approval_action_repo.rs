//! Repository for the append-only `approval_actions` table.

use clearance_core::clearance::NewApprovalAction;
use clearance_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::clearance::ApprovalActionRow;

/// Column list for approval_actions queries.
const COLUMNS: &str = "id, clearance_request_id, approver_id, office_id, step_order, \
    resubmission_round, status_id, comment, action_date, created_at";

/// Appends and lists approval actions. Rows are never updated or deleted.
pub struct ApprovalActionRepo;

impl ApprovalActionRepo {
    /// Append an action inside the caller's transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        input: &NewApprovalAction,
    ) -> Result<ApprovalActionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO approval_actions
                (clearance_request_id, approver_id, office_id, step_order,
                 resubmission_round, status_id, comment, action_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApprovalActionRow>(&query)
            .bind(input.clearance_request_id)
            .bind(input.approver_id)
            .bind(input.office_id)
            .bind(input.step_order)
            .bind(input.resubmission_round)
            .bind(input.status.id())
            .bind(&input.comment)
            .bind(input.action_date)
            .fetch_one(conn)
            .await
    }

    /// List every action of a request in the order it was recorded.
    pub async fn list_for_request(
        pool: &PgPool,
        clearance_request_id: DbId,
    ) -> Result<Vec<ApprovalActionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_actions
             WHERE clearance_request_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, ApprovalActionRow>(&query)
            .bind(clearance_request_id)
            .fetch_all(pool)
            .await
    }
}
