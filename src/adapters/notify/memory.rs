use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{Notification, UserId};
use crate::ports::{Notifier, NotifyError};

/// Keeps notifications per recipient. Delivery (mail, push) happens
/// elsewhere; this only records and logs.
#[derive(Default)]
pub struct InMemoryNotifier {
    inbox: DashMap<UserId, Vec<Notification>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = %notification.recipient,
            title = %notification.title,
            "Recording notification"
        );
        self.inbox
            .entry(notification.recipient.clone())
            .or_default()
            .push(notification.clone());
        Ok(())
    }

    async fn notifications_for(&self, user: &UserId) -> Vec<Notification> {
        let mut notifications = self
            .inbox
            .get(user)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications
    }
}
