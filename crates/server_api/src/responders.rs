//! Bundle-to-view shaping, one responder per page.
//!
//! Responders borrow their bundle and never change it. The slot names they
//! bind are the names the templates read.

use serde::Serialize;
use serde_json::{Map, Value};
use shared::records::{
    GroupTaskSummary, NotificationSummary, PaymentHistorySummary, TagWithCount, TaskSummary,
    TokenBalance, TokenTransactionSummary,
};

use crate::{error::ResponderError, view::View};

pub trait Responder {
    type Bundle;

    fn respond(&self, bundle: &Self::Bundle) -> Result<View, ResponderError>;
}

/// Accumulates bindings for one template.
struct Bindings {
    template: &'static str,
    values: Map<String, Value>,
}

impl Bindings {
    fn for_template(template: &'static str) -> Self {
        Self {
            template,
            values: Map::new(),
        }
    }

    fn bind<T: Serialize + ?Sized>(
        mut self,
        slot: &'static str,
        value: &T,
    ) -> Result<Self, ResponderError> {
        let value = serde_json::to_value(value).map_err(|source| ResponderError::Binding {
            template: self.template,
            slot,
            source,
        })?;
        self.values.insert(slot.to_string(), value);
        Ok(self)
    }

    fn finish(self) -> View {
        View::new(self.template, self.values)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentHistoryBundle {
    pub histories: Vec<PaymentHistorySummary>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentResponder;

impl PaymentResponder {
    pub const TEMPLATE: &'static str = "admin.payment-history";
}

impl Responder for PaymentResponder {
    type Bundle = PaymentHistoryBundle;

    fn respond(&self, bundle: &PaymentHistoryBundle) -> Result<View, ResponderError> {
        Ok(Bindings::for_template(Self::TEMPLATE)
            .bind("histories", &bundle.histories)?
            .finish())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskListBundle {
    pub tasks: Vec<TaskSummary>,
    pub tags: Vec<TagWithCount>,
    /// Unread notifications for the header badge; the view shows 0 when unknown.
    pub notification_count: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskListResponder;

impl TaskListResponder {
    pub const TEMPLATE: &'static str = "dashboard";
}

impl Responder for TaskListResponder {
    type Bundle = TaskListBundle;

    fn respond(&self, bundle: &TaskListBundle) -> Result<View, ResponderError> {
        Ok(Bindings::for_template(Self::TEMPLATE)
            .bind("tasks", &bundle.tasks)?
            .bind("tags", &bundle.tags)?
            .bind("notificationCount", &bundle.notification_count.unwrap_or(0))?
            .finish())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupTaskBundle {
    pub group_tasks: Vec<GroupTaskSummary>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GroupTaskResponder;

impl GroupTaskResponder {
    pub const TEMPLATE: &'static str = "group-tasks.index";
}

impl Responder for GroupTaskResponder {
    type Bundle = GroupTaskBundle;

    fn respond(&self, bundle: &GroupTaskBundle) -> Result<View, ResponderError> {
        Ok(Bindings::for_template(Self::TEMPLATE)
            .bind("groupTasks", &bundle.group_tasks)?
            .finish())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationBundle {
    pub notifications: Vec<NotificationSummary>,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationResponder;

impl NotificationResponder {
    pub const TEMPLATE: &'static str = "notifications.index";
}

impl Responder for NotificationResponder {
    type Bundle = NotificationBundle;

    fn respond(&self, bundle: &NotificationBundle) -> Result<View, ResponderError> {
        Ok(Bindings::for_template(Self::TEMPLATE)
            .bind("notifications", &bundle.notifications)?
            .bind("unreadCount", &bundle.unread_count)?
            .finish())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenHistoryBundle {
    pub balance: TokenBalance,
    pub transactions: Vec<TokenTransactionSummary>,
    pub monthly_purchase_amount: i64,
    pub monthly_purchase_tokens: i64,
    pub monthly_usage: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenResponder;

impl TokenResponder {
    pub const TEMPLATE: &'static str = "tokens.history";
}

impl Responder for TokenResponder {
    type Bundle = TokenHistoryBundle;

    fn respond(&self, bundle: &TokenHistoryBundle) -> Result<View, ResponderError> {
        Ok(Bindings::for_template(Self::TEMPLATE)
            .bind("balance", &bundle.balance)?
            .bind("transactions", &bundle.transactions)?
            .bind("monthlyPurchaseAmount", &bundle.monthly_purchase_amount)?
            .bind("monthlyPurchaseTokens", &bundle.monthly_purchase_tokens)?
            .bind("monthlyUsage", &bundle.monthly_usage)?
            .finish())
    }
}
