//! Repository for the `clearance_requests` table.

use clearance_core::clearance::{ClearanceRequest, NewClearanceRequest};
use clearance_core::status::ClearanceStatus;
use clearance_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::clearance::ClearanceRequestRow;

/// Column list for clearance_requests queries.
const COLUMNS: &str = "id, requester_id, form_type, program_id, workflow_rule_id, status_id, \
    current_step, rejection_reason, resubmission_count, version, created_at, updated_at";

/// Provides reads and version-checked writes for clearance requests.
pub struct ClearanceRepo;

impl ClearanceRepo {
    /// Insert a freshly submitted request at `PENDING(1)`.
    pub async fn create(
        pool: &PgPool,
        input: &NewClearanceRequest,
    ) -> Result<ClearanceRequestRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO clearance_requests
                (requester_id, form_type, program_id, workflow_rule_id, status_id, current_step)
             VALUES ($1, $2, $3, $4, $5, 1)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClearanceRequestRow>(&query)
            .bind(input.requester_id)
            .bind(input.form_type.as_str())
            .bind(input.program_id)
            .bind(input.workflow_rule_id)
            .bind(ClearanceStatus::Pending.id())
            .fetch_one(pool)
            .await
    }

    /// Find a request by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ClearanceRequestRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clearance_requests WHERE id = $1");
        sqlx::query_as::<_, ClearanceRequestRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a requester's requests, newest first.
    pub async fn list_for_requester(
        pool: &PgPool,
        requester_id: DbId,
    ) -> Result<Vec<ClearanceRequestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM clearance_requests
             WHERE requester_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ClearanceRequestRow>(&query)
            .bind(requester_id)
            .fetch_all(pool)
            .await
    }

    /// Pending requests whose current step is bound to `office_id`, oldest first.
    pub async fn list_queue_for_office(
        pool: &PgPool,
        office_id: DbId,
    ) -> Result<Vec<ClearanceRequestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {cols} FROM clearance_requests cr
             JOIN workflow_steps ws
               ON ws.workflow_rule_id = cr.workflow_rule_id
              AND ws.step_order = cr.current_step
             WHERE ws.office_id = $1 AND cr.status_id = $2
             ORDER BY cr.updated_at ASC, cr.id ASC",
            cols = prefixed_columns("cr")
        );
        sqlx::query_as::<_, ClearanceRequestRow>(&query)
            .bind(office_id)
            .bind(ClearanceStatus::Pending.id())
            .fetch_all(pool)
            .await
    }

    /// Write the mutable lifecycle fields if the stored version still equals
    /// `expected_version`, bumping it by one.
    ///
    /// Returns `None` when the compare-and-swap matched no row.
    pub async fn update_with_version_check(
        conn: &mut PgConnection,
        request: &ClearanceRequest,
        expected_version: i32,
    ) -> Result<Option<ClearanceRequestRow>, sqlx::Error> {
        let query = format!(
            "UPDATE clearance_requests SET
                status_id = $3,
                current_step = $4,
                rejection_reason = $5,
                resubmission_count = $6,
                version = version + 1,
                updated_at = now()
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClearanceRequestRow>(&query)
            .bind(request.id)
            .bind(expected_version)
            .bind(request.status.id())
            .bind(request.current_step)
            .bind(&request.rejection_reason)
            .bind(request.resubmission_count)
            .fetch_optional(conn)
            .await
    }
}

fn prefixed_columns(alias: &str) -> String {
    COLUMNS
        .split(", ")
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
