//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not qualify, so handlers enforce authorization in their signatures.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use clearance_core::roles::{is_requester_role, ROLE_ADMIN, ROLE_APPROVER};
use clearance_core::types::DbId;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 otherwise.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Forbidden("Admin role required".into()));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires the `approver` role and an office claim.
///
/// The office id is unpacked so handlers never see an approver without one.
pub struct RequireApprover(pub AuthUser, pub DbId);

impl FromRequestParts<AppState> for RequireApprover {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_APPROVER {
            return Err(AppError::Forbidden("Approver role required".into()));
        }
        let office_id = user
            .office_id
            .ok_or_else(|| AppError::Forbidden("Approver is not assigned to an office".into()))?;
        Ok(RequireApprover(user, office_id))
    }
}

/// Requires a role that may file clearance requests (student or teacher).
pub struct RequireRequester(pub AuthUser);

impl FromRequestParts<AppState> for RequireRequester {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !is_requester_role(&user.role) {
            return Err(AppError::Forbidden("Student or teacher role required".into()));
        }
        Ok(RequireRequester(user))
    }
}
