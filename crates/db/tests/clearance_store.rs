//! Integration tests for the PostgreSQL clearance store.
//!
//! Exercises the repositories and `PgClearanceStore` against a real database:
//! - Versioned workflow publishing and exact-match resolution
//! - Compare-and-swap commits and the final-action unique index
//! - Full approval chains driven through `ClearanceEngine`

use std::sync::Arc;

use assert_matches::assert_matches;
use clearance_core::clearance::{Actor, NewApprovalAction, NewClearanceRequest};
use clearance_core::engine::{ClearanceEngine, SubmitClearance};
use clearance_core::error::{StoreError, WorkflowError};
use clearance_core::form_type::FormType;
use clearance_core::notification::NotificationKind;
use clearance_core::status::{ActionStatus, ClearanceStatus};
use clearance_core::store::memory::RecordingSink;
use clearance_core::store::ClearanceStore;
use clearance_db::models::office::CreateOffice;
use clearance_db::models::program::CreateProgram;
use clearance_db::models::user::CreateUser;
use clearance_db::models::workflow::PublishWorkflowRule;
use clearance_db::repositories::{ClearanceRepo, OfficeRepo, ProgramRepo, UserRepo, WorkflowRepo};
use clearance_db::PgClearanceStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Fixture {
    program_id: i64,
    library: i64,
    finance: i64,
    librarian: i64,
    cashier: i64,
    student: i64,
}

async fn user(pool: &PgPool, email: &str, role: &str, office_id: Option<i64>) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            full_name: email.to_string(),
            role: role.to_string(),
            office_id,
            program_id: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn office(pool: &PgPool, name: &str) -> i64 {
    OfficeRepo::create(
        pool,
        &CreateOffice {
            name: name.to_string(),
            description: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed(pool: &PgPool) -> Fixture {
    let program_id = ProgramRepo::create(
        pool,
        &CreateProgram {
            name: "Computer Science".to_string(),
        },
    )
    .await
    .unwrap()
    .id;
    let library = office(pool, "Library").await;
    let finance = office(pool, "Finance").await;
    let librarian = user(pool, "librarian@uni.test", "approver", Some(library)).await;
    let cashier = user(pool, "cashier@uni.test", "approver", Some(finance)).await;
    let student = user(pool, "student@uni.test", "student", None).await;

    WorkflowRepo::publish(
        pool,
        &PublishWorkflowRule {
            form_type: FormType::Termination,
            program_id: Some(program_id),
            office_ids: vec![library, finance],
        },
        None,
    )
    .await
    .unwrap();

    Fixture {
        program_id,
        library,
        finance,
        librarian,
        cashier,
        student,
    }
}

fn engine(pool: &PgPool) -> (ClearanceEngine, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let engine = ClearanceEngine::new(
        Arc::new(PgClearanceStore::new(pool.clone())),
        sink.clone(),
    );
    (engine, sink)
}

fn termination(f: &Fixture) -> SubmitClearance {
    SubmitClearance {
        form_type: FormType::Termination,
        program_id: Some(f.program_id),
    }
}

// ---------------------------------------------------------------------------
// Workflow catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publish_bumps_version_and_keeps_old_steps(pool: PgPool) {
    let f = seed(&pool).await;
    let v1 = WorkflowRepo::find_active(&pool, FormType::Termination, Some(f.program_id))
        .await
        .unwrap()
        .unwrap();

    let (v2, steps) = WorkflowRepo::publish(
        &pool,
        &PublishWorkflowRule {
            form_type: FormType::Termination,
            program_id: Some(f.program_id),
            office_ids: vec![f.finance],
        },
        None,
    )
    .await
    .unwrap();

    assert_eq!(v2.version, v1.version + 1);
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].step_order, 1);

    let active = WorkflowRepo::find_active(&pool, FormType::Termination, Some(f.program_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, v2.id);

    let retired = WorkflowRepo::find_by_id(&pool, v1.id).await.unwrap().unwrap();
    assert!(!retired.is_active);
    assert_eq!(WorkflowRepo::list_steps(&pool, v1.id).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_null_program_matches_only_null(pool: PgPool) {
    let f = seed(&pool).await;
    let store = PgClearanceStore::new(pool.clone());

    assert!(store
        .find_active_rule(FormType::Termination, None)
        .await
        .unwrap()
        .is_none());

    WorkflowRepo::publish(
        &pool,
        &PublishWorkflowRule {
            form_type: FormType::StaffClearance,
            program_id: None,
            office_ids: vec![f.finance],
        },
        None,
    )
    .await
    .unwrap();

    assert!(store
        .find_active_rule(FormType::StaffClearance, None)
        .await
        .unwrap()
        .is_some());
    assert!(store
        .find_active_rule(FormType::StaffClearance, Some(f.program_id))
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Store commits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stale_version_commit_is_conflict(pool: PgPool) {
    let f = seed(&pool).await;
    let store = PgClearanceStore::new(pool.clone());
    let rule = store
        .find_active_rule(FormType::Termination, Some(f.program_id))
        .await
        .unwrap()
        .unwrap();
    let request = store
        .insert_request(&NewClearanceRequest {
            requester_id: f.student,
            form_type: FormType::Termination,
            program_id: Some(f.program_id),
            workflow_rule_id: rule.id,
        })
        .await
        .unwrap();
    assert_eq!(request.version, 1);
    assert_eq!(request.status, ClearanceStatus::Pending);

    let action = NewApprovalAction {
        clearance_request_id: request.id,
        approver_id: f.librarian,
        office_id: f.library,
        step_order: 1,
        resubmission_round: 0,
        status: ActionStatus::Approved,
        comment: None,
        action_date: chrono::Utc::now(),
    };
    let mut next = request.clone();
    next.current_step = 2;

    let (committed, recorded) = store
        .commit_transition(&next, 1, Some(&action))
        .await
        .unwrap();
    assert_eq!(committed.version, 2);
    assert_eq!(committed.current_step, 2);
    assert_eq!(recorded.unwrap().status, ActionStatus::Approved);

    let result = store.commit_transition(&next, 1, Some(&action)).await;
    assert_matches!(result, Err(StoreError::VersionConflict { .. }));

    // The losing commit rolled back entirely.
    assert_eq!(store.list_actions(request.id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_final_action_maps_to_conflict(pool: PgPool) {
    let f = seed(&pool).await;
    let store = PgClearanceStore::new(pool.clone());
    let rule = store
        .find_active_rule(FormType::Termination, Some(f.program_id))
        .await
        .unwrap()
        .unwrap();
    let request = store
        .insert_request(&NewClearanceRequest {
            requester_id: f.student,
            form_type: FormType::Termination,
            program_id: Some(f.program_id),
            workflow_rule_id: rule.id,
        })
        .await
        .unwrap();
    let action = NewApprovalAction {
        clearance_request_id: request.id,
        approver_id: f.librarian,
        office_id: f.library,
        step_order: 1,
        resubmission_round: 0,
        status: ActionStatus::Rejected,
        comment: Some("fees".to_string()),
        action_date: chrono::Utc::now(),
    };

    let (committed, _) = store
        .commit_transition(&request, 1, Some(&action))
        .await
        .unwrap();

    // Correct version, but the step already has a final decision this round.
    let result = store
        .commit_transition(&committed, committed.version, Some(&action))
        .await;
    assert_matches!(result, Err(StoreError::VersionConflict { .. }));
}

// ---------------------------------------------------------------------------
// Engine over PostgreSQL
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_approval_chain(pool: PgPool) {
    let f = seed(&pool).await;
    let (engine, sink) = engine(&pool);

    let submitted = engine
        .submit(Actor::requester(f.student), &termination(&f))
        .await
        .unwrap();
    let id = submitted.request.id;
    let kinds: Vec<_> = sink.take().into_iter().map(|n| n.kind).collect();
    assert!(kinds.contains(&NotificationKind::Submitted));
    assert!(kinds.contains(&NotificationKind::StepAssigned));

    let queue = ClearanceRepo::list_queue_for_office(&pool, f.library)
        .await
        .unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].id, id);

    engine
        .approve(id, Actor::approver(f.librarian, f.library), None, None)
        .await
        .unwrap();
    assert!(ClearanceRepo::list_queue_for_office(&pool, f.library)
        .await
        .unwrap()
        .is_empty());

    let done = engine
        .approve(
            id,
            Actor::approver(f.cashier, f.finance),
            Some("paid".to_string()),
            None,
        )
        .await
        .unwrap();
    assert_eq!(done.request.status, ClearanceStatus::Completed);
    assert_eq!(done.request.version, 3);

    let history = engine.history(id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].office_id, f.library);
    assert_eq!(history[1].comment.as_deref(), Some("paid"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reject_then_resubmit_restarts_at_step_one(pool: PgPool) {
    let f = seed(&pool).await;
    let (engine, _sink) = engine(&pool);
    let id = engine
        .submit(Actor::requester(f.student), &termination(&f))
        .await
        .unwrap()
        .request
        .id;

    engine
        .approve(id, Actor::approver(f.librarian, f.library), None, None)
        .await
        .unwrap();
    let rejected = engine
        .reject(
            id,
            Actor::approver(f.cashier, f.finance),
            Some("Outstanding fees".to_string()),
            None,
        )
        .await
        .unwrap();
    assert_eq!(rejected.request.status, ClearanceStatus::Rejected);
    assert_eq!(
        rejected.request.rejection_reason.as_deref(),
        Some("Outstanding fees")
    );

    let resubmitted = engine
        .resubmit(id, Actor::requester(f.student), None)
        .await
        .unwrap();
    assert_eq!(resubmitted.request.status, ClearanceStatus::Pending);
    assert_eq!(resubmitted.request.current_step, 1);
    assert_eq!(resubmitted.request.resubmission_count, 1);
    assert_eq!(resubmitted.request.rejection_reason, None);

    // Round 1 can decide step 1 again despite the round 0 decision.
    engine
        .approve(id, Actor::approver(f.librarian, f.library), None, None)
        .await
        .unwrap();
    let history = engine.history(id).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].resubmission_round, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_wrong_office_leaves_request_untouched(pool: PgPool) {
    let f = seed(&pool).await;
    let (engine, _sink) = engine(&pool);
    let id = engine
        .submit(Actor::requester(f.student), &termination(&f))
        .await
        .unwrap()
        .request
        .id;

    let result = engine
        .approve(id, Actor::approver(f.cashier, f.finance), None, None)
        .await;
    assert_matches!(result, Err(WorkflowError::WrongOffice { .. }));

    let row = ClearanceRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.version, 1);
    assert_eq!(row.current_step, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_racing_approvals_commit_once(pool: PgPool) {
    let f = seed(&pool).await;
    let second_librarian = user(&pool, "librarian2@uni.test", "approver", Some(f.library)).await;
    let (engine, _sink) = engine(&pool);
    let id = engine
        .submit(Actor::requester(f.student), &termination(&f))
        .await
        .unwrap()
        .request
        .id;

    let a = engine.clone();
    let b = engine.clone();
    let library = f.library;
    let librarian = f.librarian;
    let (first, second) = tokio::join!(
        tokio::spawn(async move {
            a.approve(id, Actor::approver(librarian, library), None, Some(1))
                .await
        }),
        tokio::spawn(async move {
            b.approve(id, Actor::approver(second_librarian, library), None, Some(1))
                .await
        }),
    );
    let results = [first.unwrap(), second.unwrap()];

    let committed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(committed, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(WorkflowError::ConcurrentTransitionConflict { .. })
    )));
    assert_eq!(engine.history(id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_late_librarian_without_version_gets_conflict(pool: PgPool) {
    let f = seed(&pool).await;
    let second_librarian = user(&pool, "librarian2@uni.test", "approver", Some(f.library)).await;
    let (engine, _sink) = engine(&pool);
    let id = engine
        .submit(Actor::requester(f.student), &termination(&f))
        .await
        .unwrap()
        .request
        .id;

    engine
        .approve(id, Actor::approver(f.librarian, f.library), None, None)
        .await
        .unwrap();
    let late = engine
        .approve(id, Actor::approver(second_librarian, f.library), None, None)
        .await;
    assert_matches!(late, Err(WorkflowError::ConcurrentTransitionConflict { .. }));

    let row = ClearanceRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.version, 2);
    assert_eq!(row.current_step, 2);
    assert_eq!(engine.history(id).await.unwrap().len(), 1);
}
