use super::*;

async fn storage_with_user(username: &str) -> (Storage, UserId) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let user = storage.create_user(username).await.expect("user");
    (storage, user)
}

fn task(user: UserId, title: &str) -> NewTask {
    NewTask {
        user_id: Some(user),
        title: title.to_string(),
        ..NewTask::default()
    }
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("dashboard_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn create_user_is_idempotent_per_username() {
    let (storage, alice) = storage_with_user("alice").await;
    let again = storage.create_user("alice").await.expect("user");
    assert_eq!(alice, again);

    let loaded = storage.load_user(alice).await.expect("load").expect("user");
    assert_eq!(loaded.username, "alice");
    assert_eq!(loaded.group_id, None);
    assert_eq!(loaded.token_mode, TokenMode::Individual);
}

#[tokio::test]
async fn lists_open_tasks_first_with_their_tags() {
    let (storage, user) = storage_with_user("alice").await;

    let done = storage
        .create_task(&task(user, "done"))
        .await
        .expect("task");
    storage.set_task_completed(done, true).await.expect("complete");

    let mut tagged = task(user, "tagged");
    tagged.tags = vec!["home".into(), "chores".into()];
    tagged.due_date = NaiveDate::from_ymd_opt(2030, 1, 1);
    storage.create_task(&tagged).await.expect("task");

    let tasks = storage.list_tasks_for_user(user).await.expect("tasks");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "tagged");
    assert!(!tasks[0].is_completed);
    let tag_names: Vec<_> = tasks[0].tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tag_names, vec!["chores", "home"]);
    assert_eq!(tasks[1].title, "done");
    assert!(tasks[1].is_completed);
    assert!(tasks[1].tags.is_empty());
}

#[tokio::test]
async fn tag_counts_ignore_completed_tasks() {
    let (storage, user) = storage_with_user("alice").await;

    let mut open = task(user, "open");
    open.tags = vec!["home".into()];
    storage.create_task(&open).await.expect("task");

    let mut closed = task(user, "closed");
    closed.tags = vec!["home".into(), "work".into()];
    let closed_id = storage.create_task(&closed).await.expect("task");
    storage
        .set_task_completed(closed_id, true)
        .await
        .expect("complete");

    let tags = storage.list_tags_for_user(user).await.expect("tags");
    assert_eq!(tags.len(), 2);
    assert_eq!((tags[0].name.as_str(), tags[0].task_count), ("home", 1));
    assert_eq!((tags[1].name.as_str(), tags[1].task_count), ("work", 0));
}

#[tokio::test]
async fn group_tasks_fold_member_copies() {
    let (storage, master) = storage_with_user("master").await;
    let child = storage.create_user("child").await.expect("user");
    let group = storage
        .create_group("family", master, Some(3))
        .await
        .expect("group");
    storage.join_group(group, child).await.expect("join");

    let copies: Vec<NewTask> = [master, child]
        .into_iter()
        .map(|member| NewTask {
            group_task_id: Some("gt-1".into()),
            assigned_by: Some(master),
            reward: Some(50),
            ..task(member, "clean room")
        })
        .collect();
    let ids = storage.create_tasks(&copies).await.expect("tasks");
    storage.set_task_completed(ids[1], true).await.expect("complete");

    let listed = storage
        .list_group_tasks_assigned_by(master)
        .await
        .expect("group tasks");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].group_task_id, "gt-1");
    assert_eq!(listed[0].assignee_count, 2);
    assert_eq!(listed[0].completed_count, 1);
    assert_eq!(listed[0].reward, Some(50));

    assert_eq!(
        storage
            .count_group_tasks_this_month(group)
            .await
            .expect("count"),
        1
    );
    assert_eq!(
        storage.list_group_members(group).await.expect("members"),
        vec![master, child]
    );
    let summary = storage
        .group_for_user(child)
        .await
        .expect("group")
        .expect("member of group");
    assert_eq!(summary.master_user_id, master);
    assert_eq!(summary.monthly_group_task_limit, Some(3));
}

#[tokio::test]
async fn notifications_list_newest_first_and_count_unread() {
    let (storage, user) = storage_with_user("alice").await;
    for n in 0..3 {
        storage
            .create_notification(&NewNotification {
                user_id: user,
                kind: "system".into(),
                title: format!("notice {n}"),
                message: "body".into(),
                action_url: None,
            })
            .await
            .expect("notification");
    }

    let listed = storage
        .list_notifications_for_user(user, 2)
        .await
        .expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].title, "notice 2");
    assert_eq!(
        storage.unread_notification_count(user).await.expect("count"),
        3
    );
}

#[tokio::test]
async fn token_ledger_tracks_buckets_and_monthly_usage() {
    let (storage, user) = storage_with_user("alice").await;
    let owner = TokenOwner::User(user);
    assert!(storage.token_balance(owner).await.expect("balance").is_none());

    storage
        .record_token_transaction(owner, TransactionKind::Free, 100, Some("monthly grant"))
        .await
        .expect("free");
    storage
        .record_token_transaction(owner, TransactionKind::Purchase, 500, None)
        .await
        .expect("purchase");
    storage
        .record_token_transaction(owner, TransactionKind::Consume, -150, Some("ai"))
        .await
        .expect("consume");

    let balance = storage
        .token_balance(owner)
        .await
        .expect("balance")
        .expect("row");
    assert_eq!(balance.free_balance, 0);
    assert_eq!(balance.paid_balance, 450);
    assert_eq!(balance.balance, 450);

    let ledger = storage
        .list_token_transactions(owner, 10)
        .await
        .expect("ledger");
    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger[0].kind, TransactionKind::Consume);
    assert_eq!(ledger[0].balance_after, 450);
    assert_eq!(storage.monthly_token_usage(owner).await.expect("usage"), 150);
}

#[tokio::test]
async fn payment_histories_resolve_payer_and_package() {
    let (storage, user) = storage_with_user("alice").await;
    let group = storage.create_group("family", user, None).await.expect("group");
    let package = storage
        .create_token_package("starter", 400, 1000)
        .await
        .expect("package");

    storage
        .record_payment(
            TokenOwner::User(user),
            Some(package),
            400,
            1000,
            PaymentStatus::Succeeded,
        )
        .await
        .expect("payment");
    storage
        .record_payment(TokenOwner::Group(group), None, 900, 3000, PaymentStatus::Failed)
        .await
        .expect("payment");

    let histories = storage.list_payment_histories(20).await.expect("histories");
    assert_eq!(histories.len(), 2);
    assert_eq!(histories[0].payer, TokenOwner::Group(group));
    assert_eq!(histories[0].payer_name.as_deref(), Some("family"));
    assert_eq!(histories[0].status, PaymentStatus::Failed);
    assert_eq!(histories[1].package_name.as_deref(), Some("starter"));

    let owner = TokenOwner::User(user);
    assert_eq!(storage.monthly_purchase_amount(owner).await.expect("sum"), 400);
    assert_eq!(storage.monthly_purchase_tokens(owner).await.expect("sum"), 1000);
    assert_eq!(
        storage
            .monthly_purchase_amount(TokenOwner::Group(group))
            .await
            .expect("sum"),
        0
    );

    let limited = storage.list_payment_histories(1).await.expect("histories");
    assert_eq!(limited.len(), 1);
}
