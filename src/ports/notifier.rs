use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Notification, UserId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifyError {
    #[error("Failed to record notification: {0}")]
    Record(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Notifications for `user`, newest first.
    async fn notifications_for(&self, user: &UserId) -> Vec<Notification>;
}
