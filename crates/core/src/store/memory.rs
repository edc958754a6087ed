//! In-process [`ClearanceStore`] backed by a mutex-guarded arena.
//!
//! Mirrors the PostgreSQL store's semantics: one active rule per
//! `(form_type, program_id)`, compare-and-swap on the request version, and
//! at most one finalized action per `(request, round, step)`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{ClearanceStore, NotificationSink};
use crate::clearance::{ApprovalAction, ClearanceRequest, NewApprovalAction, NewClearanceRequest};
use crate::error::StoreError;
use crate::form_type::FormType;
use crate::notification::NotificationIntent;
use crate::status::ClearanceStatus;
use crate::types::DbId;
use crate::workflow::{validate_office_chain, WorkflowRule, WorkflowStep};

#[derive(Default)]
struct Inner {
    last_id: DbId,
    rules: Vec<WorkflowRule>,
    steps: Vec<WorkflowStep>,
    requests: HashMap<DbId, ClearanceRequest>,
    actions: Vec<ApprovalAction>,
    approvers: HashMap<DbId, Vec<DbId>>,
}

impl Inner {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }
}

/// Thread-safe in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory store mutex poisoned".to_string()))
    }

    /// Publish a new rule version bound to `office_ids` in order, retiring
    /// the previously active version for the same pair.
    pub fn publish_rule(
        &self,
        form_type: FormType,
        program_id: Option<DbId>,
        office_ids: &[DbId],
    ) -> Result<(WorkflowRule, Vec<WorkflowStep>), StoreError> {
        validate_office_chain(office_ids).map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut inner = self.lock()?;
        let mut version = 1;
        for rule in inner
            .rules
            .iter_mut()
            .filter(|r| r.form_type == form_type && r.program_id == program_id)
        {
            version = version.max(rule.version + 1);
            rule.is_active = false;
        }

        let rule = WorkflowRule {
            id: inner.next_id(),
            form_type,
            program_id,
            version,
            is_active: true,
            created_at: Utc::now(),
        };
        let mut steps = Vec::with_capacity(office_ids.len());
        for (index, office_id) in office_ids.iter().enumerate() {
            steps.push(WorkflowStep {
                id: inner.next_id(),
                workflow_rule_id: rule.id,
                step_order: index as i32 + 1,
                office_id: *office_id,
            });
        }

        inner.rules.push(rule.clone());
        inner.steps.extend(steps.iter().cloned());
        Ok((rule, steps))
    }

    /// Make `user_id` an approver of `office_id`.
    pub fn add_approver(&self, office_id: DbId, user_id: DbId) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let members = inner.approvers.entry(office_id).or_default();
        if !members.contains(&user_id) {
            members.push(user_id);
        }
        Ok(())
    }
}

#[async_trait]
impl ClearanceStore for MemoryStore {
    async fn find_active_rule(
        &self,
        form_type: FormType,
        program_id: Option<DbId>,
    ) -> Result<Option<WorkflowRule>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .rules
            .iter()
            .find(|r| r.is_active && r.form_type == form_type && r.program_id == program_id)
            .cloned())
    }

    async fn list_steps(&self, rule_id: DbId) -> Result<Vec<WorkflowStep>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .steps
            .iter()
            .filter(|s| s.workflow_rule_id == rule_id)
            .cloned()
            .collect())
    }

    async fn find_request(&self, id: DbId) -> Result<Option<ClearanceRequest>, StoreError> {
        Ok(self.lock()?.requests.get(&id).cloned())
    }

    async fn insert_request(
        &self,
        input: &NewClearanceRequest,
    ) -> Result<ClearanceRequest, StoreError> {
        let mut inner = self.lock()?;
        let now = Utc::now();
        let request = ClearanceRequest {
            id: inner.next_id(),
            requester_id: input.requester_id,
            form_type: input.form_type,
            program_id: input.program_id,
            workflow_rule_id: input.workflow_rule_id,
            status: ClearanceStatus::Pending,
            current_step: 1,
            rejection_reason: None,
            resubmission_count: 0,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        inner.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn commit_transition(
        &self,
        request: &ClearanceRequest,
        expected_version: i32,
        action: Option<&NewApprovalAction>,
    ) -> Result<(ClearanceRequest, Option<ApprovalAction>), StoreError> {
        let mut inner = self.lock()?;

        let stored_version = inner
            .requests
            .get(&request.id)
            .map(|r| r.version)
            .ok_or_else(|| StoreError::Backend(format!("clearance request {} missing", request.id)))?;
        if stored_version != expected_version {
            return Err(StoreError::VersionConflict {
                request_id: request.id,
            });
        }

        if let Some(new) = action {
            let duplicate = inner.actions.iter().any(|a| {
                a.clearance_request_id == new.clearance_request_id
                    && a.resubmission_round == new.resubmission_round
                    && a.step_order == new.step_order
                    && a.status.is_final()
            });
            if duplicate && new.status.is_final() {
                return Err(StoreError::VersionConflict {
                    request_id: request.id,
                });
            }
        }

        let mut updated = request.clone();
        updated.version = expected_version + 1;
        inner.requests.insert(updated.id, updated.clone());

        let recorded = action.map(|new| {
            let recorded = ApprovalAction {
                id: inner.next_id(),
                clearance_request_id: new.clearance_request_id,
                approver_id: new.approver_id,
                office_id: new.office_id,
                step_order: new.step_order,
                resubmission_round: new.resubmission_round,
                status: new.status,
                comment: new.comment.clone(),
                action_date: Some(new.action_date),
                created_at: Utc::now(),
            };
            inner.actions.push(recorded.clone());
            recorded
        });

        Ok((updated, recorded))
    }

    async fn list_actions(&self, request_id: DbId) -> Result<Vec<ApprovalAction>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .actions
            .iter()
            .filter(|a| a.clearance_request_id == request_id)
            .cloned()
            .collect())
    }

    async fn list_approvers_by_office(&self, office_id: DbId) -> Result<Vec<DbId>, StoreError> {
        Ok(self
            .lock()?
            .approvers
            .get(&office_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Sink that records every delivered intent, in delivery order.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<NotificationIntent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything delivered so far.
    pub fn take(&self) -> Vec<NotificationIntent> {
        match self.delivered.lock() {
            Ok(mut delivered) => std::mem::take(&mut *delivered),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl NotificationSink for RecordingSink {
    fn deliver(&self, intents: &[NotificationIntent]) {
        match self.delivered.lock() {
            Ok(mut delivered) => delivered.extend_from_slice(intents),
            Err(poisoned) => poisoned.into_inner().extend_from_slice(intents),
        }
    }
}
