//! PostgreSQL implementation of the engine's [`ClearanceStore`].

use async_trait::async_trait;
use clearance_core::clearance::{
    ApprovalAction, ClearanceRequest, NewApprovalAction, NewClearanceRequest,
};
use clearance_core::error::StoreError;
use clearance_core::form_type::FormType;
use clearance_core::store::ClearanceStore;
use clearance_core::types::DbId;
use clearance_core::workflow::{WorkflowRule, WorkflowStep};
use sqlx::PgPool;

use crate::repositories::{ApprovalActionRepo, ClearanceRepo, OfficeRepo, WorkflowRepo};

/// Name of the partial unique index that allows one finalized action per
/// `(request, resubmission_round, step_order)`.
const FINAL_ACTION_INDEX: &str = "uq_approval_actions_final_step";

/// [`ClearanceStore`] over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgClearanceStore {
    pool: PgPool,
}

impl PgClearanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Map an error from the transition transaction, treating a lost race on
/// the final-action index as a version conflict.
fn classify_commit_error(err: sqlx::Error, request_id: DbId) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() && db_err.constraint() == Some(FINAL_ACTION_INDEX) {
            return StoreError::VersionConflict { request_id };
        }
    }
    backend(err)
}

#[async_trait]
impl ClearanceStore for PgClearanceStore {
    async fn find_active_rule(
        &self,
        form_type: FormType,
        program_id: Option<DbId>,
    ) -> Result<Option<WorkflowRule>, StoreError> {
        WorkflowRepo::find_active(&self.pool, form_type, program_id)
            .await
            .map_err(backend)?
            .map(|row| row.into_domain())
            .transpose()
    }

    async fn list_steps(&self, rule_id: DbId) -> Result<Vec<WorkflowStep>, StoreError> {
        let rows = WorkflowRepo::list_steps(&self.pool, rule_id)
            .await
            .map_err(backend)?;
        Ok(rows.into_iter().map(WorkflowStep::from).collect())
    }

    async fn find_request(&self, id: DbId) -> Result<Option<ClearanceRequest>, StoreError> {
        ClearanceRepo::find_by_id(&self.pool, id)
            .await
            .map_err(backend)?
            .map(|row| row.into_domain())
            .transpose()
    }

    async fn insert_request(
        &self,
        input: &NewClearanceRequest,
    ) -> Result<ClearanceRequest, StoreError> {
        ClearanceRepo::create(&self.pool, input)
            .await
            .map_err(backend)?
            .into_domain()
    }

    async fn commit_transition(
        &self,
        request: &ClearanceRequest,
        expected_version: i32,
        action: Option<&NewApprovalAction>,
    ) -> Result<(ClearanceRequest, Option<ApprovalAction>), StoreError> {
        let classify = |e: sqlx::Error| classify_commit_error(e, request.id);
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let updated = ClearanceRepo::update_with_version_check(&mut *tx, request, expected_version)
            .await
            .map_err(classify)?;
        let Some(updated) = updated else {
            tracing::debug!(
                request_id = request.id,
                expected_version,
                "Version check matched no row"
            );
            return Err(StoreError::VersionConflict {
                request_id: request.id,
            });
        };

        let recorded = match action {
            Some(new) => Some(
                ApprovalActionRepo::insert(&mut *tx, new)
                    .await
                    .map_err(classify)?
                    .into_domain()?,
            ),
            None => None,
        };

        tx.commit().await.map_err(classify)?;
        Ok((updated.into_domain()?, recorded))
    }

    async fn list_actions(&self, request_id: DbId) -> Result<Vec<ApprovalAction>, StoreError> {
        ApprovalActionRepo::list_for_request(&self.pool, request_id)
            .await
            .map_err(backend)?
            .into_iter()
            .map(|row| row.into_domain())
            .collect()
    }

    async fn list_approvers_by_office(&self, office_id: DbId) -> Result<Vec<DbId>, StoreError> {
        OfficeRepo::list_approver_ids(&self.pool, office_id)
            .await
            .map_err(backend)
    }
}
