//! Clearance workflow engine.
//!
//! Orchestrates one operation per call: read the request, resolve its
//! captured workflow, run the guard and the pure state machine, commit the
//! result with a compare-and-swap on the request version, then route the
//! outcome to notification intents and hand them to the sink.
//!
//! The engine holds no per-request state between calls and spawns nothing.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::clearance::{Actor, ApprovalAction, ClearanceRequest, NewClearanceRequest};
use crate::error::WorkflowError;
use crate::form_type::FormType;
use crate::notification::{self, NotificationIntent};
use crate::resolver;
use crate::store::{ClearanceStore, NotificationSink};
use crate::transition::{self, Command, TransitionOutcome};
use crate::types::DbId;

/// Input for a new clearance request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitClearance {
    pub form_type: FormType,
    pub program_id: Option<DbId>,
}

/// Everything a committed operation produced.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionReport {
    /// Request state as committed (with its new version).
    pub request: ClearanceRequest,
    pub action: Option<ApprovalAction>,
    pub outcome: TransitionOutcome,
    /// Intents already handed to the sink.
    pub notifications: Vec<NotificationIntent>,
}

/// The clearance workflow engine. Cheap to clone.
#[derive(Clone)]
pub struct ClearanceEngine {
    store: Arc<dyn ClearanceStore>,
    sink: Arc<dyn NotificationSink>,
}

impl ClearanceEngine {
    pub fn new(store: Arc<dyn ClearanceStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }

    pub fn store(&self) -> &dyn ClearanceStore {
        self.store.as_ref()
    }

    /// File a new request at step 1 of the active workflow.
    pub async fn submit(
        &self,
        requester: Actor,
        input: &SubmitClearance,
    ) -> Result<TransitionReport, WorkflowError> {
        input.form_type.validate_program(input.program_id)?;

        let workflow =
            resolver::resolve(self.store.as_ref(), input.form_type, input.program_id).await?;

        let request = self
            .store
            .insert_request(&NewClearanceRequest {
                requester_id: requester.user_id,
                form_type: input.form_type,
                program_id: input.program_id,
                workflow_rule_id: workflow.rule.id,
            })
            .await?;
        let outcome = transition::submitted(&request, &workflow.steps)?;

        tracing::info!(
            request_id = request.id,
            requester_id = requester.user_id,
            form_type = %input.form_type,
            program_id = ?input.program_id,
            workflow_rule_id = workflow.rule.id,
            step_count = workflow.step_count(),
            "Clearance request submitted"
        );

        let notifications = self.notify(&outcome).await;
        Ok(TransitionReport {
            request,
            action: None,
            outcome,
            notifications,
        })
    }

    /// Approve the current step on behalf of `approver`'s office.
    pub async fn approve(
        &self,
        request_id: DbId,
        approver: Actor,
        comment: Option<String>,
        expected_version: Option<i32>,
    ) -> Result<TransitionReport, WorkflowError> {
        self.execute(
            request_id,
            Command::Approve { approver, comment },
            expected_version,
        )
        .await
    }

    /// Reject the current step; `comment` becomes the rejection reason.
    pub async fn reject(
        &self,
        request_id: DbId,
        approver: Actor,
        comment: Option<String>,
        expected_version: Option<i32>,
    ) -> Result<TransitionReport, WorkflowError> {
        self.execute(
            request_id,
            Command::Reject { approver, comment },
            expected_version,
        )
        .await
    }

    /// Restart a rejected request from step 1.
    pub async fn resubmit(
        &self,
        request_id: DbId,
        requester: Actor,
        expected_version: Option<i32>,
    ) -> Result<TransitionReport, WorkflowError> {
        self.execute(request_id, Command::Resubmit { requester }, expected_version)
            .await
    }

    /// Run `command` against the stored request.
    ///
    /// When `expected_version` is given and differs from the stored version
    /// the call fails with [`WorkflowError::ConcurrentTransitionConflict`]
    /// before any other check.
    pub async fn execute(
        &self,
        request_id: DbId,
        command: Command,
        expected_version: Option<i32>,
    ) -> Result<TransitionReport, WorkflowError> {
        let result = self.try_execute(request_id, &command, expected_version).await;
        if let Err(e) = &result {
            tracing::warn!(
                request_id,
                operation = command.name(),
                error = %e,
                "Clearance transition refused"
            );
        }
        result
    }

    async fn try_execute(
        &self,
        request_id: DbId,
        command: &Command,
        expected_version: Option<i32>,
    ) -> Result<TransitionReport, WorkflowError> {
        let request = self.load(request_id).await?;

        if expected_version.is_some_and(|v| v != request.version) {
            return Err(WorkflowError::ConcurrentTransitionConflict { request_id });
        }

        let steps = resolver::resolve_rule(self.store.as_ref(), request.workflow_rule_id).await?;
        let planned = match transition::apply(&request, &steps, command, Utc::now()) {
            Ok(planned) => planned,
            Err(err @ WorkflowError::WrongOffice { .. }) => {
                return Err(self.explain_wrong_office(&request, command, err).await);
            }
            Err(err) => return Err(err),
        };

        let (committed, action) = self
            .store
            .commit_transition(&planned.next, request.version, planned.action.as_ref())
            .await?;

        tracing::info!(
            request_id,
            operation = command.name(),
            status = %committed.status,
            current_step = committed.current_step,
            version = committed.version,
            "Clearance transition committed"
        );

        let notifications = self.notify(&planned.outcome).await;
        Ok(TransitionReport {
            request: committed,
            action,
            outcome: planned.outcome,
            notifications,
        })
    }

    /// Approval history of a request, across all resubmission rounds.
    pub async fn history(&self, request_id: DbId) -> Result<Vec<ApprovalAction>, WorkflowError> {
        self.load(request_id).await?;
        Ok(self.store.list_actions(request_id).await?)
    }

    async fn load(&self, request_id: DbId) -> Result<ClearanceRequest, WorkflowError> {
        self.store
            .find_request(request_id)
            .await?
            .ok_or(WorkflowError::NotFound {
                entity: "ClearanceRequest",
                id: request_id,
            })
    }

    /// Turn a `WrongOffice` refusal into a conflict when the acting office
    /// already finalized its step in the current round.
    ///
    /// That happens when another member of the same office decided first and
    /// the request moved on before this call loaded it.
    async fn explain_wrong_office(
        &self,
        request: &ClearanceRequest,
        command: &Command,
        err: WorkflowError,
    ) -> WorkflowError {
        let office_id = match command {
            Command::Approve { approver, .. } | Command::Reject { approver, .. } => {
                approver.office_id
            }
            Command::Resubmit { .. } => None,
        };
        let Some(office_id) = office_id else {
            return err;
        };

        match self.store.list_actions(request.id).await {
            Ok(actions) => {
                let decided = actions.iter().any(|a| {
                    a.resubmission_round == request.resubmission_count
                        && a.office_id == office_id
                        && a.status.is_final()
                });
                if decided {
                    WorkflowError::ConcurrentTransitionConflict {
                        request_id: request.id,
                    }
                } else {
                    err
                }
            }
            Err(e) => e.into(),
        }
    }

    /// Route `outcome` and hand the intents to the sink.
    ///
    /// Runs after commit; a failed approver lookup only narrows the fan-out.
    async fn notify(&self, outcome: &TransitionOutcome) -> Vec<NotificationIntent> {
        let approvers = match outcome.next_office() {
            Some(office_id) => match self.store.list_approvers_by_office(office_id).await {
                Ok(ids) => ids,
                Err(e) => {
                    tracing::error!(
                        office_id,
                        request_id = outcome.request_id(),
                        error = %e,
                        "Failed to list office approvers, notifying requester only"
                    );
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let intents = notification::route(outcome, &approvers);
        self.sink.deliver(&intents);
        intents
    }
}
