//! Well-known role name constants.
//!
//! These must match the `users.role` CHECK constraint in
//! `20260301000001_create_identity_tables.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_APPROVER: &str = "approver";
pub const ROLE_STUDENT: &str = "student";
pub const ROLE_TEACHER: &str = "teacher";

/// Roles allowed to file clearance requests.
pub fn is_requester_role(role: &str) -> bool {
    role == ROLE_STUDENT || role == ROLE_TEACHER
}
