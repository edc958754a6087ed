//! User models. Accounts are managed elsewhere; the workflow only needs
//! identity, role, and office membership.

use clearance_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub office_id: Option<DbId>,
    pub program_id: Option<DbId>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for provisioning a user record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub office_id: Option<DbId>,
    pub program_id: Option<DbId>,
}
