//! Read models handed from repositories to responders.
//!
//! These are serialized verbatim into template bindings, so field names are
//! what the views see.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    GroupId, NotificationId, PaymentHistoryId, PaymentStatus, TagId, TaskId, TaskSpan,
    TokenOwner, TransactionId, TransactionKind, UserId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSummary {
    pub tag_id: TagId,
    pub name: String,
}

/// A tag as listed on the dashboard, with the number of open tasks using it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagWithCount {
    pub tag_id: TagId,
    pub name: String,
    pub task_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub task_id: TaskId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub span: TaskSpan,
    pub due_date: Option<NaiveDate>,
    pub is_completed: bool,
    pub group_task_id: Option<String>,
    pub reward: Option<i64>,
    pub tags: Vec<TagSummary>,
    pub created_at: DateTime<Utc>,
}

/// One row of the group task list: all per-member copies sharing a
/// `group_task_id` folded together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTaskSummary {
    pub group_task_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub reward: Option<i64>,
    pub assignee_count: i64,
    pub completed_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSummary {
    pub notification_id: NotificationId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub action_url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub owner: TokenOwner,
    pub balance: i64,
    pub free_balance: i64,
    pub paid_balance: i64,
}

impl TokenBalance {
    pub fn empty(owner: TokenOwner) -> Self {
        Self {
            owner,
            balance: 0,
            free_balance: 0,
            paid_balance: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransactionSummary {
    pub transaction_id: TransactionId,
    pub kind: TransactionKind,
    pub amount: i64,
    pub balance_after: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentHistorySummary {
    pub payment_history_id: PaymentHistoryId,
    pub payer: TokenOwner,
    pub payer_name: Option<String>,
    pub package_name: Option<String>,
    pub amount: i64,
    pub token_amount: i64,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group_id: GroupId,
    pub name: String,
    pub master_user_id: UserId,
    /// Group tasks allowed per calendar month; `None` means unlimited.
    pub monthly_group_task_limit: Option<i64>,
}
