use super::*;
use std::sync::{
    atomic::{AtomicU32, AtomicUsize, Ordering},
    Mutex,
};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;
use shared::{
    domain::{GroupId, PaymentHistoryId, PaymentStatus, TaskId},
    records::{GroupSummary, PaymentHistorySummary, TagWithCount, TaskSummary},
};
use storage::Storage;

#[derive(Default)]
struct RecordingPayments {
    calls: AtomicUsize,
    last_limit: AtomicU32,
    histories: Vec<PaymentHistorySummary>,
}

#[async_trait]
impl PaymentRepository for RecordingPayments {
    async fn payment_histories(&self, limit: u32) -> anyhow::Result<Vec<PaymentHistorySummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_limit.store(limit, Ordering::SeqCst);
        Ok(self.histories.clone())
    }
}

/// Task store whose group lookups refuse with a recoverable error.
struct QuotaGuardedTasks {
    created: Mutex<Vec<NewTask>>,
}

#[async_trait]
impl TaskRepository for QuotaGuardedTasks {
    async fn tasks_for_user(&self, _user_id: UserId) -> anyhow::Result<Vec<TaskSummary>> {
        Ok(Vec::new())
    }

    async fn tags_for_user(&self, _user_id: UserId) -> anyhow::Result<Vec<TagWithCount>> {
        Ok(Vec::new())
    }

    async fn group_for_user(&self, user_id: UserId) -> anyhow::Result<Option<GroupSummary>> {
        Ok(Some(GroupSummary {
            group_id: GroupId(1),
            name: "family".into(),
            master_user_id: user_id,
            monthly_group_task_limit: Some(1),
        }))
    }

    async fn group_members(&self, _group_id: GroupId) -> anyhow::Result<Vec<UserId>> {
        Ok(vec![UserId(1), UserId(2)])
    }

    async fn group_tasks_created_this_month(&self, _group_id: GroupId) -> anyhow::Result<i64> {
        Err(RedirectException::new("quota exceeded")).context("counting group tasks")
    }

    async fn create_tasks(&self, tasks: &[NewTask]) -> anyhow::Result<Vec<TaskId>> {
        let mut created = self.created.lock().expect("lock");
        created.extend_from_slice(tasks);
        Ok((0..tasks.len() as i64).map(TaskId).collect())
    }
}

fn payment(id: i64) -> PaymentHistorySummary {
    PaymentHistorySummary {
        payment_history_id: PaymentHistoryId(id),
        payer: TokenOwner::User(UserId(1)),
        payer_name: Some("alice".into()),
        package_name: None,
        amount: 100 * id,
        token_amount: 1000 * id,
        status: PaymentStatus::Succeeded,
        created_at: Utc.with_ymd_and_hms(2026, 9, 30, 12, 0, 0).unwrap(),
    }
}

fn input(user_id: UserId, fields: &[(&str, &str)]) -> ActionInput {
    ActionInput::new(
        user_id,
        SubmittedInput::new(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ),
    )
}

#[tokio::test]
async fn payment_history_reads_once_with_page_size_twenty() {
    let repo = Arc::new(RecordingPayments {
        histories: vec![payment(3), payment(1), payment(2)],
        ..RecordingPayments::default()
    });
    let action = IndexPaymentHistoryAction::new(repo.clone());

    let view = action.invoke(&input(UserId(1), &[])).await.expect("view");

    assert_eq!(repo.calls.load(Ordering::SeqCst), 1);
    assert_eq!(repo.last_limit.load(Ordering::SeqCst), 20);
    assert_eq!(view.template(), "admin.payment-history");
    let expected = serde_json::to_value(&repo.histories).expect("json");
    assert_eq!(view.binding("histories"), Some(&expected));
}

#[tokio::test]
async fn payment_history_renders_empty_result() {
    let repo = Arc::new(RecordingPayments::default());
    let action = IndexPaymentHistoryAction::new(repo);
    let view = action.invoke(&input(UserId(1), &[])).await.expect("view");
    assert_eq!(view.binding("histories"), Some(&json!([])));
}

#[tokio::test]
async fn redirect_raised_by_repository_reaches_the_caller() {
    let repo = Arc::new(QuotaGuardedTasks {
        created: Mutex::new(Vec::new()),
    });
    let action = StoreTaskAction::new(repo.clone());

    let err = action
        .invoke(&input(
            UserId(1),
            &[("title", "vacuum"), ("is_group_task", "1")],
        ))
        .await
        .expect_err("should redirect");

    match err {
        ActionError::Redirect(redirect) => assert_eq!(redirect.message(), "quota exceeded"),
        ActionError::Fault(other) => panic!("expected redirect, got {other:#}"),
    }
    assert!(repo.created.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn store_task_rejects_blank_title() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let user = storage.create_user("alice").await.expect("user");
    let action = StoreTaskAction::new(Arc::new(storage));

    let err = action
        .invoke(&input(user, &[("title", "   ")]))
        .await
        .expect_err("should redirect");
    assert!(matches!(
        err,
        ActionError::Redirect(ref r) if r.message() == "The title field is required."
    ));
}

#[tokio::test]
async fn store_task_rejects_malformed_due_date() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let user = storage.create_user("alice").await.expect("user");
    let action = StoreTaskAction::new(Arc::new(storage));

    let err = action
        .invoke(&input(user, &[("title", "x"), ("due_date", "31/12/2026")]))
        .await
        .expect_err("should redirect");
    assert!(err.is_redirect());
}

#[tokio::test]
async fn stored_task_appears_on_dashboard() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let user = storage.create_user("alice").await.expect("user");
    let repo = Arc::new(storage);

    let stored = StoreTaskAction::new(repo.clone())
        .invoke(&input(
            user,
            &[
                ("title", "read a book"),
                ("span", "mid"),
                ("due_date", "2030-04-01"),
                ("tags", "study, home ,study"),
            ],
        ))
        .await
        .expect("stored");
    assert_eq!(stored.created, 1);
    assert_eq!(stored.message(), "Task created.");

    let view = IndexTaskAction::new(repo.clone(), repo)
        .invoke(&input(user, &[]))
        .await
        .expect("view");
    let tasks = view.binding("tasks").and_then(|t| t.as_array()).expect("tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], json!("read a book"));
    assert_eq!(tasks[0]["span"], json!("mid"));
    assert_eq!(tasks[0]["due_date"], json!("2030-04-01"));
    assert_eq!(tasks[0]["tags"].as_array().map(Vec::len), Some(2));
    assert_eq!(view.binding("notificationCount"), Some(&json!(0)));
}

#[tokio::test]
async fn group_task_is_copied_to_members_until_limit() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let master = storage.create_user("parent").await.expect("user");
    let kid_a = storage.create_user("kid-a").await.expect("user");
    let kid_b = storage.create_user("kid-b").await.expect("user");
    let group = storage
        .create_group("family", master, Some(1))
        .await
        .expect("group");
    storage.join_group(group, kid_a).await.expect("join");
    storage.join_group(group, kid_b).await.expect("join");
    let repo = Arc::new(storage);
    let action = StoreTaskAction::new(repo.clone());

    let stored = action
        .invoke(&input(
            master,
            &[("title", "clean up"), ("is_group_task", "on"), ("reward", "30")],
        ))
        .await
        .expect("stored");
    assert_eq!(stored.created, 2);
    assert!(stored.group_task_id.is_some());

    let listing = IndexGroupTaskAction::new(repo.clone())
        .invoke(&input(master, &[]))
        .await
        .expect("view");
    let rows = listing
        .binding("groupTasks")
        .and_then(|v| v.as_array())
        .expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["assignee_count"], json!(2));

    let err = action
        .invoke(&input(master, &[("title", "again"), ("is_group_task", "on")]))
        .await
        .expect_err("limit reached");
    match err {
        ActionError::Redirect(redirect) => {
            assert!(redirect.message().contains("limit (1)"), "{}", redirect.message())
        }
        ActionError::Fault(other) => panic!("expected redirect, got {other:#}"),
    }
}

#[tokio::test]
async fn only_group_master_may_create_group_tasks() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let master = storage.create_user("parent").await.expect("user");
    let kid = storage.create_user("kid").await.expect("user");
    let group = storage.create_group("family", master, None).await.expect("group");
    storage.join_group(group, kid).await.expect("join");

    let err = StoreTaskAction::new(Arc::new(storage))
        .invoke(&input(kid, &[("title", "x"), ("is_group_task", "1")]))
        .await
        .expect_err("forbidden");
    assert!(matches!(
        err,
        ActionError::Redirect(ref r) if r.message() == "You do not have permission to create group tasks."
    ));
}

#[tokio::test]
async fn notifications_page_lists_and_counts_unread() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let user = storage.create_user("alice").await.expect("user");
    storage
        .create_notification(&storage::NewNotification {
            user_id: user,
            kind: "payment_success".into(),
            title: "Purchase complete".into(),
            message: "starter pack".into(),
            action_url: Some("/tokens/history".into()),
        })
        .await
        .expect("notification");

    let view = IndexNotificationAction::new(Arc::new(storage))
        .invoke(&input(user, &[]))
        .await
        .expect("view");
    assert_eq!(view.template(), "notifications.index");
    assert_eq!(view.binding("unreadCount"), Some(&json!(1)));
    assert_eq!(
        view.binding("notifications").and_then(|n| n[0]["title"].as_str()),
        Some("Purchase complete")
    );
}

#[tokio::test]
async fn token_history_uses_group_wallet_in_group_mode() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let master = storage.create_user("parent").await.expect("user");
    let group = storage.create_group("family", master, None).await.expect("group");
    storage
        .set_token_mode(master, TokenMode::Group)
        .await
        .expect("mode");
    storage
        .record_token_transaction(
            TokenOwner::Group(group),
            shared::domain::TransactionKind::Free,
            300,
            None,
        )
        .await
        .expect("grant");
    storage
        .record_token_transaction(
            TokenOwner::User(master),
            shared::domain::TransactionKind::Free,
            7,
            None,
        )
        .await
        .expect("grant");

    let view = IndexTokenHistoryAction::new(Arc::new(storage))
        .invoke(&input(master, &[]))
        .await
        .expect("view");
    assert_eq!(
        view.binding("balance").map(|b| &b["balance"]),
        Some(&json!(300))
    );
    assert_eq!(
        view.binding("transactions").and_then(|t| t.as_array()).map(Vec::len),
        Some(1)
    );
    assert_eq!(view.binding("monthlyUsage"), Some(&json!(0)));
}

#[tokio::test]
async fn token_history_for_fresh_user_binds_empty_balance() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let user = storage.create_user("new").await.expect("user");

    let view = IndexTokenHistoryAction::new(Arc::new(storage))
        .invoke(&input(user, &[]))
        .await
        .expect("view");
    assert_eq!(view.binding("balance").map(|b| &b["paid_balance"]), Some(&json!(0)));
    assert_eq!(view.binding("transactions"), Some(&json!([])));
}
