//! Handlers for the caller's persisted notifications.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use clearance_core::error::WorkflowError;
use clearance_core::types::DbId;
use clearance_db::models::notification::Notification;
use clearance_db::repositories::NotificationRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UnreadFilter {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}

/// GET /api/v1/notifications?limit=&offset=&unread_only=
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<UnreadFilter>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let notifications = NotificationRepo::list_for_user(
        &state.pool,
        auth.user_id,
        filter.unread_only,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let unread = NotificationRepo::count_unread(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: UnreadCount { unread },
    }))
}

/// POST /api/v1/notifications/{id}/read
///
/// Returns 404 for notifications that belong to someone else.
pub async fn mark_notification_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !NotificationRepo::mark_read(&state.pool, id, auth.user_id).await? {
        return Err(WorkflowError::NotFound {
            entity: "Notification",
            id,
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}
