//! Repository for the `programs` table.

use sqlx::PgPool;

use crate::models::program::{CreateProgram, Program};

const COLUMNS: &str = "id, name, created_at";

pub struct ProgramRepo;

impl ProgramRepo {
    pub async fn create(pool: &PgPool, input: &CreateProgram) -> Result<Program, sqlx::Error> {
        let query = format!("INSERT INTO programs (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Program>(&query)
            .bind(input.name.trim())
            .fetch_one(pool)
            .await
    }

    /// List all programs ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Program>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM programs ORDER BY name ASC");
        sqlx::query_as::<_, Program>(&query).fetch_all(pool).await
    }
}
