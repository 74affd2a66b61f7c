//! Route-bound actions.
//!
//! An action reads from its repositories, fills one bundle and hands it to
//! its responder. Repository errors are not caught here; they surface as
//! [`ActionError`], which tells recoverable redirects apart from faults.

use std::{collections::BTreeSet, sync::Arc};

use chrono::NaiveDate;
use shared::{
    domain::{TaskSpan, TokenMode, TokenOwner, UserId},
    error::RedirectException,
    records::TokenBalance,
};
use storage::NewTask;
use tracing::{debug, info};

use crate::{
    error::ActionError,
    repository::{
        GroupTaskRepository, NotificationRepository, PaymentRepository, TaskRepository,
        TokenRepository,
    },
    responders::{
        GroupTaskBundle, GroupTaskResponder, NotificationBundle, NotificationResponder,
        PaymentHistoryBundle, PaymentResponder, Responder, TaskListBundle, TaskListResponder,
        TokenHistoryBundle, TokenResponder,
    },
    view::{SubmittedInput, View},
};

pub const PAYMENT_HISTORY_PAGE_SIZE: u32 = 20;
pub const NOTIFICATION_PAGE_SIZE: u32 = 15;
pub const TOKEN_TRANSACTION_PAGE_SIZE: u32 = 20;
pub const MAX_TASK_TITLE_CHARS: usize = 255;

/// What an action gets to see of the request.
#[derive(Debug, Clone)]
pub struct ActionInput {
    pub user_id: UserId,
    pub submitted: SubmittedInput,
}

impl ActionInput {
    pub fn new(user_id: UserId, submitted: SubmittedInput) -> Self {
        Self { user_id, submitted }
    }
}

/// Admin list of the latest payments.
pub struct IndexPaymentHistoryAction {
    payments: Arc<dyn PaymentRepository>,
    responder: PaymentResponder,
}

impl IndexPaymentHistoryAction {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self {
            payments,
            responder: PaymentResponder,
        }
    }

    pub async fn invoke(&self, _input: &ActionInput) -> Result<View, ActionError> {
        let histories = self
            .payments
            .payment_histories(PAYMENT_HISTORY_PAGE_SIZE)
            .await?;
        debug!(count = histories.len(), "payment histories loaded");
        Ok(self
            .responder
            .respond(&PaymentHistoryBundle { histories })?)
    }
}

/// The dashboard: the caller's tasks, tags and unread notification badge.
pub struct IndexTaskAction {
    tasks: Arc<dyn TaskRepository>,
    notifications: Arc<dyn NotificationRepository>,
    responder: TaskListResponder,
}

impl IndexTaskAction {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        notifications: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            tasks,
            notifications,
            responder: TaskListResponder,
        }
    }

    pub async fn invoke(&self, input: &ActionInput) -> Result<View, ActionError> {
        let tasks = self.tasks.tasks_for_user(input.user_id).await?;
        let tags = self.tasks.tags_for_user(input.user_id).await?;
        let notification_count = self.notifications.unread_count(input.user_id).await?;
        debug!(
            user_id = input.user_id.0,
            tasks = tasks.len(),
            tags = tags.len(),
            "dashboard loaded"
        );
        Ok(self.responder.respond(&TaskListBundle {
            tasks,
            tags,
            notification_count: Some(notification_count),
        })?)
    }
}

/// Group tasks the caller has handed out.
pub struct IndexGroupTaskAction {
    group_tasks: Arc<dyn GroupTaskRepository>,
    responder: GroupTaskResponder,
}

impl IndexGroupTaskAction {
    pub fn new(group_tasks: Arc<dyn GroupTaskRepository>) -> Self {
        Self {
            group_tasks,
            responder: GroupTaskResponder,
        }
    }

    pub async fn invoke(&self, input: &ActionInput) -> Result<View, ActionError> {
        let group_tasks = self
            .group_tasks
            .group_tasks_assigned_by(input.user_id)
            .await?;
        Ok(self.responder.respond(&GroupTaskBundle { group_tasks })?)
    }
}

pub struct IndexNotificationAction {
    notifications: Arc<dyn NotificationRepository>,
    responder: NotificationResponder,
}

impl IndexNotificationAction {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self {
            notifications,
            responder: NotificationResponder,
        }
    }

    pub async fn invoke(&self, input: &ActionInput) -> Result<View, ActionError> {
        let notifications = self
            .notifications
            .notifications_for_user(input.user_id, NOTIFICATION_PAGE_SIZE)
            .await?;
        let unread_count = self.notifications.unread_count(input.user_id).await?;
        Ok(self.responder.respond(&NotificationBundle {
            notifications,
            unread_count,
        })?)
    }
}

/// Token balance, ledger and this month's purchase/usage totals.
///
/// Users in group token mode see their group's wallet.
pub struct IndexTokenHistoryAction {
    tokens: Arc<dyn TokenRepository>,
    responder: TokenResponder,
}

impl IndexTokenHistoryAction {
    pub fn new(tokens: Arc<dyn TokenRepository>) -> Self {
        Self {
            tokens,
            responder: TokenResponder,
        }
    }

    pub async fn invoke(&self, input: &ActionInput) -> Result<View, ActionError> {
        let owner = self.wallet_for(input.user_id).await?;
        let balance = self
            .tokens
            .balance_for(owner)
            .await?
            .unwrap_or_else(|| TokenBalance::empty(owner));
        let transactions = self
            .tokens
            .transactions_for(owner, TOKEN_TRANSACTION_PAGE_SIZE)
            .await?;
        let monthly_purchase_amount = self.tokens.monthly_purchase_amount(owner).await?;
        let monthly_purchase_tokens = self.tokens.monthly_purchase_tokens(owner).await?;
        let monthly_usage = self.tokens.monthly_usage(owner).await?;

        Ok(self.responder.respond(&TokenHistoryBundle {
            balance,
            transactions,
            monthly_purchase_amount,
            monthly_purchase_tokens,
            monthly_usage,
        })?)
    }

    async fn wallet_for(&self, user_id: UserId) -> anyhow::Result<TokenOwner> {
        let owner = match self.tokens.load_user(user_id).await? {
            Some(user) if user.token_mode == TokenMode::Group => user
                .group_id
                .map(TokenOwner::Group)
                .unwrap_or(TokenOwner::User(user_id)),
            _ => TokenOwner::User(user_id),
        };
        Ok(owner)
    }
}

/// Result of a successful task form post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStored {
    pub created: usize,
    pub group_task_id: Option<String>,
}

impl TaskStored {
    pub fn message(&self) -> String {
        match self.group_task_id {
            Some(_) => format!("Group task assigned to {} member(s).", self.created),
            None => "Task created.".to_string(),
        }
    }
}

/// Stores a task from the dashboard form, or a group task copied to members.
///
/// Every rule the user can fix by editing the form fails with a
/// [`RedirectException`].
pub struct StoreTaskAction {
    tasks: Arc<dyn TaskRepository>,
}

impl StoreTaskAction {
    pub fn new(tasks: Arc<dyn TaskRepository>) -> Self {
        Self { tasks }
    }

    pub async fn invoke(&self, input: &ActionInput) -> Result<TaskStored, ActionError> {
        let form = TaskForm::parse(&input.submitted)?;

        if !form.is_group_task {
            let task = form.into_task(input.user_id, None, None);
            self.tasks.create_tasks(std::slice::from_ref(&task)).await?;
            debug!(user_id = input.user_id.0, "task stored");
            return Ok(TaskStored {
                created: 1,
                group_task_id: None,
            });
        }

        let group = self
            .tasks
            .group_for_user(input.user_id)
            .await?
            .filter(|group| group.master_user_id == input.user_id)
            .ok_or_else(|| {
                RedirectException::new("You do not have permission to create group tasks.")
            })?;

        if let Some(limit) = group.monthly_group_task_limit {
            let used = self
                .tasks
                .group_tasks_created_this_month(group.group_id)
                .await?;
            if used >= limit {
                info!(group_id = group.group_id.0, used, limit, "group task limit reached");
                return Err(ActionError::redirect(format!(
                    "This month's group task limit ({limit}) has been reached. Upgrade to premium for unlimited group tasks."
                )));
            }
        }

        let members = self.tasks.group_members(group.group_id).await?;
        let assignees: Vec<UserId> = match form.assigned_user_id {
            Some(assignee) if members.contains(&assignee) => vec![assignee],
            Some(_) => {
                return Err(ActionError::redirect(
                    "The selected assignee is not a member of your group.",
                ))
            }
            None => members
                .into_iter()
                .filter(|member| *member != input.user_id)
                .collect(),
        };
        if assignees.is_empty() {
            return Err(ActionError::redirect(
                "Your group has no members to assign this task to.",
            ));
        }

        let group_task_id = uuid::Uuid::new_v4().to_string();
        let copies: Vec<NewTask> = assignees
            .iter()
            .map(|assignee| {
                form.clone()
                    .into_task(*assignee, Some(input.user_id), Some(group_task_id.clone()))
            })
            .collect();
        self.tasks.create_tasks(&copies).await?;
        info!(
            group_id = group.group_id.0,
            %group_task_id,
            assignees = copies.len(),
            "group task stored"
        );

        Ok(TaskStored {
            created: copies.len(),
            group_task_id: Some(group_task_id),
        })
    }
}

#[derive(Debug, Clone)]
struct TaskForm {
    title: String,
    description: Option<String>,
    span: TaskSpan,
    due_date: Option<NaiveDate>,
    reward: Option<i64>,
    tags: Vec<String>,
    is_group_task: bool,
    assigned_user_id: Option<UserId>,
}

impl TaskForm {
    fn parse(input: &SubmittedInput) -> Result<Self, RedirectException> {
        let title = input.get("title").map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return Err(RedirectException::new("The title field is required."));
        }
        if title.chars().count() > MAX_TASK_TITLE_CHARS {
            return Err(RedirectException::new(format!(
                "The title may not be greater than {MAX_TASK_TITLE_CHARS} characters."
            )));
        }

        let span = match non_blank(input.get("span")) {
            Some(raw) => TaskSpan::parse(raw)
                .ok_or_else(|| RedirectException::new("The selected span is invalid."))?,
            None => TaskSpan::default(),
        };

        let due_date = non_blank(input.get("due_date"))
            .map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .transpose()
            .map_err(|_| RedirectException::new("The due date is not a valid date."))?;

        let reward = non_blank(input.get("reward"))
            .map(|raw| raw.parse::<i64>().ok().filter(|value| *value >= 0))
            .map(|parsed| {
                parsed.ok_or_else(|| {
                    RedirectException::new("The reward must be a whole number of at least 0.")
                })
            })
            .transpose()?;

        let assigned_user_id = non_blank(input.get("assigned_user_id"))
            .map(|raw| raw.parse::<i64>().map(UserId))
            .transpose()
            .map_err(|_| RedirectException::new("The selected assignee is invalid."))?;

        let mut seen = BTreeSet::new();
        let tags = input
            .get("tags")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty() && seen.insert(tag.to_string()))
            .map(str::to_string)
            .collect();

        Ok(Self {
            title: title.to_string(),
            description: non_blank(input.get("description")).map(str::to_string),
            span,
            due_date,
            reward,
            tags,
            is_group_task: input.flag("is_group_task"),
            assigned_user_id,
        })
    }

    fn into_task(
        self,
        user_id: UserId,
        assigned_by: Option<UserId>,
        group_task_id: Option<String>,
    ) -> NewTask {
        NewTask {
            user_id: Some(user_id),
            title: self.title,
            description: self.description,
            span: self.span,
            due_date: self.due_date,
            group_task_id,
            assigned_by,
            reward: self.reward,
            tags: self.tags,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
#[path = "tests/actions_tests.rs"]
mod tests;
