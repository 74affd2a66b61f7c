use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite, SqliteConnection,
};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::{
    domain::{
        GroupId, NotificationId, PaymentHistoryId, PaymentStatus, TagId, TaskId, TaskSpan,
        TokenMode, TokenOwner, TokenPackageId, TransactionId, TransactionKind, UserId,
    },
    records::{
        GroupSummary, GroupTaskSummary, NotificationSummary, PaymentHistorySummary, TagSummary,
        TagWithCount, TaskSummary, TokenBalance, TokenTransactionSummary,
    },
};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user_id: UserId,
    pub username: String,
    pub group_id: Option<GroupId>,
    pub token_mode: TokenMode,
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub user_id: Option<UserId>,
    pub title: String,
    pub description: Option<String>,
    pub span: TaskSpan,
    pub due_date: Option<NaiveDate>,
    pub group_task_id: Option<String>,
    pub assigned_by: Option<UserId>,
    pub reward: Option<i64>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub action_url: Option<String>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every in-memory connection is its own database.
        let max_connections = if database_url.starts_with("sqlite::memory:") {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_user(&self, username: &str) -> Result<UserId> {
        let rec = sqlx::query(
            "INSERT INTO users (username) VALUES (?)
             ON CONFLICT(username) DO UPDATE SET username=excluded.username
             RETURNING id",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(UserId(rec.get::<i64, _>(0)))
    }

    pub async fn load_user(&self, user_id: UserId) -> Result<Option<StoredUser>> {
        let row = sqlx::query("SELECT id, username, group_id, token_mode FROM users WHERE id = ?")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| StoredUser {
            user_id: UserId(r.get::<i64, _>(0)),
            username: r.get::<String, _>(1),
            group_id: r.get::<Option<i64>, _>(2).map(GroupId),
            token_mode: TokenMode::parse(&r.get::<String, _>(3)),
        }))
    }

    pub async fn set_token_mode(&self, user_id: UserId, mode: TokenMode) -> Result<()> {
        sqlx::query("UPDATE users SET token_mode = ? WHERE id = ?")
            .bind(mode.as_str())
            .bind(user_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Creates a group mastered by `master_user_id` and moves the master into it.
    pub async fn create_group(
        &self,
        name: &str,
        master_user_id: UserId,
        monthly_group_task_limit: Option<i64>,
    ) -> Result<GroupId> {
        let mut tx = self.pool.begin().await?;
        let rec = sqlx::query(
            "INSERT INTO groups (name, master_user_id, monthly_group_task_limit)
             VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(master_user_id.0)
        .bind(monthly_group_task_limit)
        .fetch_one(&mut *tx)
        .await?;
        let group_id = GroupId(rec.get::<i64, _>(0));

        sqlx::query("UPDATE users SET group_id = ? WHERE id = ?")
            .bind(group_id.0)
            .bind(master_user_id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(group_id)
    }

    pub async fn join_group(&self, group_id: GroupId, user_id: UserId) -> Result<()> {
        sqlx::query("UPDATE users SET group_id = ? WHERE id = ?")
            .bind(group_id.0)
            .bind(user_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn group_for_user(&self, user_id: UserId) -> Result<Option<GroupSummary>> {
        let row = sqlx::query(
            "SELECT g.id, g.name, g.master_user_id, g.monthly_group_task_limit
             FROM groups g
             INNER JOIN users u ON u.group_id = g.id
             WHERE u.id = ?",
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| GroupSummary {
            group_id: GroupId(r.get::<i64, _>(0)),
            name: r.get::<String, _>(1),
            master_user_id: UserId(r.get::<i64, _>(2)),
            monthly_group_task_limit: r.get::<Option<i64>, _>(3),
        }))
    }

    pub async fn list_group_members(&self, group_id: GroupId) -> Result<Vec<UserId>> {
        let rows = sqlx::query("SELECT id FROM users WHERE group_id = ? ORDER BY id")
            .bind(group_id.0)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| UserId(r.get::<i64, _>(0)))
            .collect())
    }

    /// Distinct group tasks handed out by members of `group_id` this calendar month.
    pub async fn count_group_tasks_this_month(&self, group_id: GroupId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT t.group_task_id)
             FROM tasks t
             INNER JOIN users u ON u.id = t.assigned_by
             WHERE u.group_id = ?
               AND t.group_task_id IS NOT NULL
               AND strftime('%Y-%m', t.created_at) = strftime('%Y-%m', 'now')",
        )
        .bind(group_id.0)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<TaskId> {
        let mut tx = self.pool.begin().await?;
        let task_id = insert_task(&mut tx, task).await?;
        tx.commit().await?;
        Ok(task_id)
    }

    /// Inserts all tasks atomically; used for per-member copies of a group task.
    pub async fn create_tasks(&self, tasks: &[NewTask]) -> Result<Vec<TaskId>> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(tasks.len());
        for task in tasks {
            ids.push(insert_task(&mut tx, task).await?);
        }
        tx.commit().await?;
        Ok(ids)
    }

    pub async fn set_task_completed(&self, task_id: TaskId, completed: bool) -> Result<()> {
        sqlx::query("UPDATE tasks SET is_completed = ? WHERE id = ?")
            .bind(completed)
            .bind(task_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Tasks owned by `user_id`: open before completed, earliest due date first,
    /// undated after dated, newest first within ties.
    pub async fn list_tasks_for_user(&self, user_id: UserId) -> Result<Vec<TaskSummary>> {
        let rows = sqlx::query(
            "SELECT id, user_id, title, description, span, due_date, is_completed, group_task_id, reward, created_at
             FROM tasks
             WHERE user_id = ?
             ORDER BY is_completed ASC, due_date IS NULL ASC, due_date ASC, id DESC",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;

        let tag_rows = sqlx::query(
            "SELECT tt.task_id, tg.id, tg.name
             FROM task_tag tt
             INNER JOIN tags tg ON tg.id = tt.tag_id
             INNER JOIN tasks t ON t.id = tt.task_id
             WHERE t.user_id = ?
             ORDER BY tg.name ASC",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;

        let mut tags_by_task: HashMap<i64, Vec<TagSummary>> = HashMap::new();
        for r in tag_rows {
            tags_by_task
                .entry(r.get::<i64, _>(0))
                .or_default()
                .push(TagSummary {
                    tag_id: TagId(r.get::<i64, _>(1)),
                    name: r.get::<String, _>(2),
                });
        }

        rows.into_iter()
            .map(|r| {
                let task_id = r.get::<i64, _>(0);
                let span_raw = r.get::<String, _>(4);
                Ok(TaskSummary {
                    task_id: TaskId(task_id),
                    user_id: UserId(r.get::<i64, _>(1)),
                    title: r.get::<String, _>(2),
                    description: r.get::<Option<String>, _>(3),
                    span: TaskSpan::parse(&span_raw)
                        .with_context(|| format!("unknown task span '{span_raw}'"))?,
                    due_date: r.get::<Option<NaiveDate>, _>(5),
                    is_completed: r.get::<bool, _>(6),
                    group_task_id: r.get::<Option<String>, _>(7),
                    reward: r.get::<Option<i64>, _>(8),
                    tags: tags_by_task.remove(&task_id).unwrap_or_default(),
                    created_at: r.get::<DateTime<Utc>, _>(9),
                })
            })
            .collect()
    }

    pub async fn list_tags_for_user(&self, user_id: UserId) -> Result<Vec<TagWithCount>> {
        let rows = sqlx::query(
            "SELECT tg.id, tg.name, COUNT(t.id)
             FROM tags tg
             LEFT JOIN task_tag tt ON tt.tag_id = tg.id
             LEFT JOIN tasks t ON t.id = tt.task_id AND t.is_completed = 0
             WHERE tg.user_id = ?
             GROUP BY tg.id, tg.name
             ORDER BY tg.name ASC",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| TagWithCount {
                tag_id: TagId(r.get::<i64, _>(0)),
                name: r.get::<String, _>(1),
                task_count: r.get::<i64, _>(2),
            })
            .collect())
    }

    /// Group tasks handed out by `assigned_by`, one row per `group_task_id`, newest first.
    pub async fn list_group_tasks_assigned_by(
        &self,
        assigned_by: UserId,
    ) -> Result<Vec<GroupTaskSummary>> {
        let rows = sqlx::query(
            "SELECT group_task_id, MIN(title), MIN(description), MIN(due_date), MIN(reward),
                    COUNT(*), COALESCE(SUM(is_completed), 0), MIN(created_at)
             FROM tasks
             WHERE assigned_by = ? AND group_task_id IS NOT NULL
             GROUP BY group_task_id
             ORDER BY MAX(id) DESC",
        )
        .bind(assigned_by.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| GroupTaskSummary {
                group_task_id: r.get::<String, _>(0),
                title: r.get::<String, _>(1),
                description: r.get::<Option<String>, _>(2),
                due_date: r.get::<Option<NaiveDate>, _>(3),
                reward: r.get::<Option<i64>, _>(4),
                assignee_count: r.get::<i64, _>(5),
                completed_count: r.get::<i64, _>(6),
                created_at: r.get::<DateTime<Utc>, _>(7),
            })
            .collect())
    }

    pub async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationId> {
        let rec = sqlx::query(
            "INSERT INTO notifications (user_id, kind, title, message, action_url)
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(notification.user_id.0)
        .bind(&notification.kind)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.action_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(NotificationId(rec.get::<i64, _>(0)))
    }

    pub async fn list_notifications_for_user(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<NotificationSummary>> {
        let rows = sqlx::query(
            "SELECT id, kind, title, message, action_url, is_read, created_at
             FROM notifications
             WHERE user_id = ?
             ORDER BY id DESC
             LIMIT ?",
        )
        .bind(user_id.0)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| NotificationSummary {
                notification_id: NotificationId(r.get::<i64, _>(0)),
                kind: r.get::<String, _>(1),
                title: r.get::<String, _>(2),
                message: r.get::<String, _>(3),
                action_url: r.get::<Option<String>, _>(4),
                is_read: r.get::<bool, _>(5),
                created_at: r.get::<DateTime<Utc>, _>(6),
            })
            .collect())
    }

    pub async fn unread_notification_count(&self, user_id: UserId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0",
        )
        .bind(user_id.0)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn token_balance(&self, owner: TokenOwner) -> Result<Option<TokenBalance>> {
        let row = sqlx::query(
            "SELECT balance, free_balance, paid_balance
             FROM token_balances
             WHERE owner_type = ? AND owner_id = ?",
        )
        .bind(owner.kind())
        .bind(owner.raw_id())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| TokenBalance {
            owner,
            balance: r.get::<i64, _>(0),
            free_balance: r.get::<i64, _>(1),
            paid_balance: r.get::<i64, _>(2),
        }))
    }

    /// Applies `amount` to the owner's balance and appends a ledger row.
    ///
    /// Purchases and refunds land in the paid bucket, free grants and admin
    /// adjustments in the free bucket. Consumption (`amount` negative) drains
    /// the free bucket before the paid one.
    pub async fn record_token_transaction(
        &self,
        owner: TokenOwner,
        kind: TransactionKind,
        amount: i64,
        description: Option<&str>,
    ) -> Result<TransactionId> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO token_balances (owner_type, owner_id) VALUES (?, ?)
             ON CONFLICT(owner_type, owner_id) DO NOTHING",
        )
        .bind(owner.kind())
        .bind(owner.raw_id())
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(
            "SELECT free_balance, paid_balance FROM token_balances
             WHERE owner_type = ? AND owner_id = ?",
        )
        .bind(owner.kind())
        .bind(owner.raw_id())
        .fetch_one(&mut *tx)
        .await?;
        let (mut free, mut paid) = (row.get::<i64, _>(0), row.get::<i64, _>(1));

        match kind {
            TransactionKind::Purchase | TransactionKind::Refund => paid += amount,
            TransactionKind::Free | TransactionKind::AdminAdjust => free += amount,
            TransactionKind::Consume => {
                let cost = amount.abs();
                let from_free = cost.min(free.max(0));
                free -= from_free;
                paid -= cost - from_free;
            }
        }
        let balance = free + paid;

        sqlx::query(
            "UPDATE token_balances
             SET balance = ?, free_balance = ?, paid_balance = ?, updated_at = CURRENT_TIMESTAMP
             WHERE owner_type = ? AND owner_id = ?",
        )
        .bind(balance)
        .bind(free)
        .bind(paid)
        .bind(owner.kind())
        .bind(owner.raw_id())
        .execute(&mut *tx)
        .await?;

        let rec = sqlx::query(
            "INSERT INTO token_transactions (owner_type, owner_id, kind, amount, balance_after, description)
             VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(owner.kind())
        .bind(owner.raw_id())
        .bind(kind.as_str())
        .bind(amount)
        .bind(balance)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(TransactionId(rec.get::<i64, _>(0)))
    }

    pub async fn list_token_transactions(
        &self,
        owner: TokenOwner,
        limit: u32,
    ) -> Result<Vec<TokenTransactionSummary>> {
        let rows = sqlx::query(
            "SELECT id, kind, amount, balance_after, description, created_at
             FROM token_transactions
             WHERE owner_type = ? AND owner_id = ?
             ORDER BY id DESC
             LIMIT ?",
        )
        .bind(owner.kind())
        .bind(owner.raw_id())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|r| transaction_from_row(&r)).collect()
    }

    /// Yen spent on succeeded purchases this calendar month.
    pub async fn monthly_purchase_amount(&self, owner: TokenOwner) -> Result<i64> {
        self.sum_succeeded_payments_this_month(owner, "amount").await
    }

    /// Tokens bought through succeeded purchases this calendar month.
    pub async fn monthly_purchase_tokens(&self, owner: TokenOwner) -> Result<i64> {
        self.sum_succeeded_payments_this_month(owner, "token_amount")
            .await
    }

    /// Tokens consumed this calendar month, as a positive number.
    pub async fn monthly_token_usage(&self, owner: TokenOwner) -> Result<i64> {
        let usage: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(ABS(amount)), 0)
             FROM token_transactions
             WHERE owner_type = ? AND owner_id = ? AND kind = 'consume'
               AND strftime('%Y-%m', created_at) = strftime('%Y-%m', 'now')",
        )
        .bind(owner.kind())
        .bind(owner.raw_id())
        .fetch_one(&self.pool)
        .await?;
        Ok(usage)
    }

    async fn sum_succeeded_payments_this_month(
        &self,
        owner: TokenOwner,
        column: &'static str,
    ) -> Result<i64> {
        let sql = format!(
            "SELECT COALESCE(SUM({column}), 0)
             FROM payment_histories
             WHERE payable_type = ? AND payable_id = ? AND status = 'succeeded'
               AND strftime('%Y-%m', created_at) = strftime('%Y-%m', 'now')"
        );
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(owner.kind())
            .bind(owner.raw_id())
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn create_token_package(
        &self,
        name: &str,
        price: i64,
        token_amount: i64,
    ) -> Result<TokenPackageId> {
        let rec = sqlx::query(
            "INSERT INTO token_packages (name, price, token_amount) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(price)
        .bind(token_amount)
        .fetch_one(&self.pool)
        .await?;
        Ok(TokenPackageId(rec.get::<i64, _>(0)))
    }

    pub async fn record_payment(
        &self,
        payer: TokenOwner,
        package_id: Option<TokenPackageId>,
        amount: i64,
        token_amount: i64,
        status: PaymentStatus,
    ) -> Result<PaymentHistoryId> {
        let rec = sqlx::query(
            "INSERT INTO payment_histories (payable_type, payable_id, token_package_id, amount, token_amount, status)
             VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(payer.kind())
        .bind(payer.raw_id())
        .bind(package_id.map(|id| id.0))
        .bind(amount)
        .bind(token_amount)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(PaymentHistoryId(rec.get::<i64, _>(0)))
    }

    /// Latest payments across all payers, newest first.
    pub async fn list_payment_histories(&self, limit: u32) -> Result<Vec<PaymentHistorySummary>> {
        let rows = sqlx::query(
            "SELECT ph.id, ph.payable_type, ph.payable_id,
                    CASE ph.payable_type WHEN 'user' THEN u.username WHEN 'group' THEN g.name END,
                    p.name, ph.amount, ph.token_amount, ph.status, ph.created_at
             FROM payment_histories ph
             LEFT JOIN users u ON ph.payable_type = 'user' AND u.id = ph.payable_id
             LEFT JOIN groups g ON ph.payable_type = 'group' AND g.id = ph.payable_id
             LEFT JOIN token_packages p ON p.id = ph.token_package_id
             ORDER BY ph.id DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let payable_type = r.get::<String, _>(1);
                let status = r.get::<String, _>(7);
                Ok(PaymentHistorySummary {
                    payment_history_id: PaymentHistoryId(r.get::<i64, _>(0)),
                    payer: TokenOwner::from_parts(&payable_type, r.get::<i64, _>(2))
                        .with_context(|| format!("unknown payable type '{payable_type}'"))?,
                    payer_name: r.get::<Option<String>, _>(3),
                    package_name: r.get::<Option<String>, _>(4),
                    amount: r.get::<i64, _>(5),
                    token_amount: r.get::<i64, _>(6),
                    status: PaymentStatus::parse(&status)
                        .with_context(|| format!("unknown payment status '{status}'"))?,
                    created_at: r.get::<DateTime<Utc>, _>(8),
                })
            })
            .collect()
    }
}

async fn insert_task(conn: &mut SqliteConnection, task: &NewTask) -> Result<TaskId> {
    let user_id = task
        .user_id
        .context("task must be assigned to a user before it is stored")?;
    let rec = sqlx::query(
        "INSERT INTO tasks (user_id, title, description, span, due_date, group_task_id, assigned_by, reward)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(user_id.0)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.span.as_str())
    .bind(task.due_date)
    .bind(&task.group_task_id)
    .bind(task.assigned_by.map(|id| id.0))
    .bind(task.reward)
    .fetch_one(&mut *conn)
    .await?;
    let task_id = TaskId(rec.get::<i64, _>(0));

    for name in &task.tags {
        let tag = sqlx::query(
            "INSERT INTO tags (user_id, name) VALUES (?, ?)
             ON CONFLICT(user_id, name) DO UPDATE SET name=excluded.name
             RETURNING id",
        )
        .bind(user_id.0)
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
        sqlx::query("INSERT OR IGNORE INTO task_tag (task_id, tag_id) VALUES (?, ?)")
            .bind(task_id.0)
            .bind(tag.get::<i64, _>(0))
            .execute(&mut *conn)
            .await?;
    }

    Ok(task_id)
}

fn transaction_from_row(r: &SqliteRow) -> Result<TokenTransactionSummary> {
    let kind = r.get::<String, _>(1);
    Ok(TokenTransactionSummary {
        transaction_id: TransactionId(r.get::<i64, _>(0)),
        kind: TransactionKind::parse(&kind)
            .with_context(|| format!("unknown transaction kind '{kind}'"))?,
        amount: r.get::<i64, _>(2),
        balance_after: r.get::<i64, _>(3),
        description: r.get::<Option<String>, _>(4),
        created_at: r.get::<DateTime<Utc>, _>(5),
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
