//! Narrow data-access seams consumed by actions.
//!
//! Each action receives the trait objects it needs at construction time;
//! [`Storage`] implements all of them for production use.

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{GroupId, TaskId, TokenOwner, UserId},
    records::{
        GroupSummary, GroupTaskSummary, NotificationSummary, PaymentHistorySummary,
        TagWithCount, TaskSummary, TokenBalance, TokenTransactionSummary,
    },
};
use storage::{NewTask, Storage, StoredUser};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn payment_histories(&self, limit: u32) -> Result<Vec<PaymentHistorySummary>>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn tasks_for_user(&self, user_id: UserId) -> Result<Vec<TaskSummary>>;
    async fn tags_for_user(&self, user_id: UserId) -> Result<Vec<TagWithCount>>;
    async fn group_for_user(&self, user_id: UserId) -> Result<Option<GroupSummary>>;
    async fn group_members(&self, group_id: GroupId) -> Result<Vec<UserId>>;
    async fn group_tasks_created_this_month(&self, group_id: GroupId) -> Result<i64>;
    async fn create_tasks(&self, tasks: &[NewTask]) -> Result<Vec<TaskId>>;
}

#[async_trait]
pub trait GroupTaskRepository: Send + Sync {
    async fn group_tasks_assigned_by(&self, user_id: UserId) -> Result<Vec<GroupTaskSummary>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn notifications_for_user(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<NotificationSummary>>;
    async fn unread_count(&self, user_id: UserId) -> Result<i64>;
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn load_user(&self, user_id: UserId) -> Result<Option<StoredUser>>;
    async fn balance_for(&self, owner: TokenOwner) -> Result<Option<TokenBalance>>;
    async fn transactions_for(
        &self,
        owner: TokenOwner,
        limit: u32,
    ) -> Result<Vec<TokenTransactionSummary>>;
    async fn monthly_purchase_amount(&self, owner: TokenOwner) -> Result<i64>;
    async fn monthly_purchase_tokens(&self, owner: TokenOwner) -> Result<i64>;
    async fn monthly_usage(&self, owner: TokenOwner) -> Result<i64>;
}

#[async_trait]
impl PaymentRepository for Storage {
    async fn payment_histories(&self, limit: u32) -> Result<Vec<PaymentHistorySummary>> {
        self.list_payment_histories(limit).await
    }
}

#[async_trait]
impl TaskRepository for Storage {
    async fn tasks_for_user(&self, user_id: UserId) -> Result<Vec<TaskSummary>> {
        self.list_tasks_for_user(user_id).await
    }

    async fn tags_for_user(&self, user_id: UserId) -> Result<Vec<TagWithCount>> {
        self.list_tags_for_user(user_id).await
    }

    async fn group_for_user(&self, user_id: UserId) -> Result<Option<GroupSummary>> {
        Storage::group_for_user(self, user_id).await
    }

    async fn group_members(&self, group_id: GroupId) -> Result<Vec<UserId>> {
        self.list_group_members(group_id).await
    }

    async fn group_tasks_created_this_month(&self, group_id: GroupId) -> Result<i64> {
        self.count_group_tasks_this_month(group_id).await
    }

    async fn create_tasks(&self, tasks: &[NewTask]) -> Result<Vec<TaskId>> {
        Storage::create_tasks(self, tasks).await
    }
}

#[async_trait]
impl GroupTaskRepository for Storage {
    async fn group_tasks_assigned_by(&self, user_id: UserId) -> Result<Vec<GroupTaskSummary>> {
        self.list_group_tasks_assigned_by(user_id).await
    }
}

#[async_trait]
impl NotificationRepository for Storage {
    async fn notifications_for_user(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<NotificationSummary>> {
        self.list_notifications_for_user(user_id, limit).await
    }

    async fn unread_count(&self, user_id: UserId) -> Result<i64> {
        self.unread_notification_count(user_id).await
    }
}

#[async_trait]
impl TokenRepository for Storage {
    async fn load_user(&self, user_id: UserId) -> Result<Option<StoredUser>> {
        Storage::load_user(self, user_id).await
    }

    async fn balance_for(&self, owner: TokenOwner) -> Result<Option<TokenBalance>> {
        self.token_balance(owner).await
    }

    async fn transactions_for(
        &self,
        owner: TokenOwner,
        limit: u32,
    ) -> Result<Vec<TokenTransactionSummary>> {
        self.list_token_transactions(owner, limit).await
    }

    async fn monthly_purchase_amount(&self, owner: TokenOwner) -> Result<i64> {
        Storage::monthly_purchase_amount(self, owner).await
    }

    async fn monthly_purchase_tokens(&self, owner: TokenOwner) -> Result<i64> {
        Storage::monthly_purchase_tokens(self, owner).await
    }

    async fn monthly_usage(&self, owner: TokenOwner) -> Result<i64> {
        self.monthly_token_usage(owner).await
    }
}
