//! Persistence and notification contracts consumed by the engine.
//!
//! - [`ClearanceStore`] -- durable storage for rules, steps, requests, and actions.
//! - [`NotificationSink`] -- fire-and-forget consumer of notification intents.
//! - [`memory::MemoryStore`] -- in-process store with the same version semantics.
//! - [`memory::RecordingSink`] -- sink that keeps every intent it receives.

pub mod memory;

use async_trait::async_trait;

use crate::clearance::{ApprovalAction, ClearanceRequest, NewApprovalAction, NewClearanceRequest};
use crate::error::StoreError;
use crate::form_type::FormType;
use crate::notification::NotificationIntent;
use crate::types::DbId;
use crate::workflow::{WorkflowRule, WorkflowStep};

/// Storage backend for the clearance engine.
///
/// Implementations must make [`commit_transition`](Self::commit_transition)
/// atomic: the request update and the action insert either both persist or
/// neither does.
#[async_trait]
pub trait ClearanceStore: Send + Sync {
    /// Find the active rule for an exact `(form_type, program_id)` pair.
    ///
    /// `program_id = None` matches only program-agnostic rules.
    async fn find_active_rule(
        &self,
        form_type: FormType,
        program_id: Option<DbId>,
    ) -> Result<Option<WorkflowRule>, StoreError>;

    /// List the steps of a rule version, in any order.
    async fn list_steps(&self, rule_id: DbId) -> Result<Vec<WorkflowStep>, StoreError>;

    async fn find_request(&self, id: DbId) -> Result<Option<ClearanceRequest>, StoreError>;

    /// Insert a new request at `PENDING(1)` with `version = 1`.
    async fn insert_request(
        &self,
        input: &NewClearanceRequest,
    ) -> Result<ClearanceRequest, StoreError>;

    /// Write `request` if the stored version still equals `expected_version`,
    /// bumping the version, and append `action` in the same unit.
    ///
    /// Fails with [`StoreError::VersionConflict`] when another transition
    /// committed first.
    async fn commit_transition(
        &self,
        request: &ClearanceRequest,
        expected_version: i32,
        action: Option<&NewApprovalAction>,
    ) -> Result<(ClearanceRequest, Option<ApprovalAction>), StoreError>;

    /// All actions of a request, oldest first, across every resubmission round.
    async fn list_actions(&self, request_id: DbId) -> Result<Vec<ApprovalAction>, StoreError>;

    /// User ids of active approvers belonging to `office_id`.
    async fn list_approvers_by_office(&self, office_id: DbId) -> Result<Vec<DbId>, StoreError>;
}

/// Receives notification intents after a transition commits.
///
/// Delivery success is never reported back to the engine.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, intents: &[NotificationIntent]);
}
