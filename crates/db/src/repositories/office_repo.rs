//! Repository for the `offices` table and office approver membership.

use clearance_core::roles::ROLE_APPROVER;
use clearance_core::types::DbId;
use sqlx::PgPool;

use crate::models::office::{CreateOffice, Office, OfficeApprover};

/// Column list for offices queries.
const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Provides CRUD for offices and approver assignment.
pub struct OfficeRepo;

impl OfficeRepo {
    /// Insert a new office, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateOffice) -> Result<Office, sqlx::Error> {
        let query = format!(
            "INSERT INTO offices (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Office>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find an office by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Office>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM offices WHERE id = $1");
        sqlx::query_as::<_, Office>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all offices ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Office>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM offices ORDER BY name ASC");
        sqlx::query_as::<_, Office>(&query).fetch_all(pool).await
    }

    /// Return how many of `ids` exist. Used to validate office chains before publishing.
    pub async fn count_existing(pool: &PgPool, ids: &[DbId]) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM offices WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Bind an approver account to an office.
    ///
    /// Returns `false` if the user does not exist or is not an approver.
    pub async fn assign_approver(
        pool: &PgPool,
        office_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET office_id = $1, updated_at = now()
             WHERE id = $2 AND role = $3",
        )
        .bind(office_id)
        .bind(user_id)
        .bind(ROLE_APPROVER)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the approvers of an office with their display details.
    pub async fn list_approvers(
        pool: &PgPool,
        office_id: DbId,
    ) -> Result<Vec<OfficeApprover>, sqlx::Error> {
        sqlx::query_as::<_, OfficeApprover>(
            "SELECT id AS user_id, full_name, email FROM users
             WHERE office_id = $1 AND role = $2 AND is_active
             ORDER BY full_name ASC",
        )
        .bind(office_id)
        .bind(ROLE_APPROVER)
        .fetch_all(pool)
        .await
    }

    /// User ids of the active approvers of an office.
    pub async fn list_approver_ids(pool: &PgPool, office_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM users
             WHERE office_id = $1 AND role = $2 AND is_active
             ORDER BY id ASC",
        )
        .bind(office_id)
        .bind(ROLE_APPROVER)
        .fetch_all(pool)
        .await
    }
}
