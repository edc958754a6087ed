pub mod clearance;
pub mod health;
pub mod notification;
pub mod office;
pub mod program;
pub mod workflow;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /clearances                           submit (POST)
/// /clearances/mine                      requester's requests
/// /clearances/queue                     approver's office queue
/// /clearances/{id}                      detail
/// /clearances/{id}/actions              approval history
/// /clearances/{id}/approve              approve current step (POST)
/// /clearances/{id}/reject               reject current step (POST)
/// /clearances/{id}/resubmit             restart a rejected request (POST)
///
/// /workflows                            active rules
/// /workflows/resolve                    resolution preview
/// /workflows/{id}                       any rule version
/// /admin/workflows                      publish rule version (admin)
///
/// /offices                              list
/// /offices/{id}/approvers               list approvers
/// /admin/offices                        create (admin)
/// /admin/offices/{id}/approvers         assign approver (admin)
///
/// /programs                             list
/// /admin/programs                       create (admin)
///
/// /notifications                        caller's notifications
/// /notifications/unread-count           unread badge
/// /notifications/{id}/read              mark read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/clearances", clearance::router())
        .nest("/workflows", workflow::router())
        .nest("/offices", office::router())
        .nest("/programs", program::router())
        .nest("/notifications", notification::router())
        .nest(
            "/admin",
            Router::new()
                .nest("/workflows", workflow::admin_router())
                .nest("/offices", office::admin_router())
                .nest("/programs", program::admin_router()),
        )
}
