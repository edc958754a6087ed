//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller identity from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.
//! - [`rbac::RequireApprover`] -- requires an approver bound to an office.
//! - [`rbac::RequireRequester`] -- requires a student or teacher.

pub mod auth;
pub mod rbac;
