//! Office and approver models.

use clearance_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `offices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Office {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an office.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOffice {
    pub name: String,
    pub description: Option<String>,
}

/// An approver as listed under an office.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OfficeApprover {
    pub user_id: DbId,
    pub full_name: String,
    pub email: String,
}

/// DTO for assigning a user to an office as approver.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignApprover {
    pub user_id: DbId,
}
