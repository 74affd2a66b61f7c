use std::sync::Arc;

use storage::Storage;

pub mod actions;
pub mod error;
pub mod repository;
pub mod responders;
pub mod view;

use actions::{
    IndexGroupTaskAction, IndexNotificationAction, IndexPaymentHistoryAction, IndexTaskAction,
    IndexTokenHistoryAction, StoreTaskAction,
};

/// Every route-bound action, wired to its collaborators once at startup.
#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub index_tasks: Arc<IndexTaskAction>,
    pub store_task: Arc<StoreTaskAction>,
    pub index_group_tasks: Arc<IndexGroupTaskAction>,
    pub index_notifications: Arc<IndexNotificationAction>,
    pub index_token_history: Arc<IndexTokenHistoryAction>,
    pub index_payment_history: Arc<IndexPaymentHistoryAction>,
}

impl ApiContext {
    pub fn new(storage: Storage) -> Self {
        let repo = Arc::new(storage.clone());
        Self {
            index_tasks: Arc::new(IndexTaskAction::new(repo.clone(), repo.clone())),
            store_task: Arc::new(StoreTaskAction::new(repo.clone())),
            index_group_tasks: Arc::new(IndexGroupTaskAction::new(repo.clone())),
            index_notifications: Arc::new(IndexNotificationAction::new(repo.clone())),
            index_token_history: Arc::new(IndexTokenHistoryAction::new(repo.clone())),
            index_payment_history: Arc::new(IndexPaymentHistoryAction::new(repo)),
            storage,
        }
    }
}
