use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Project, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub recipient: UserId,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn project_assigned(recipient: UserId, project: &Project, now: DateTime<Utc>) -> Self {
        Self {
            recipient,
            title: "Project Assigned".to_string(),
            message: format!("You have been assigned to project: {}", project.title),
            link: Some(format!("/project/{}", project.id)),
            read: false,
            created_at: now,
        }
    }
}
