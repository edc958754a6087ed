//! Academic program models.

use clearance_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `programs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Program {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

/// DTO for creating a program.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProgram {
    pub name: String,
}
