use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Caller, Project, ProjectId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Closed,
    Deleted,
}

/// Audit record of a close or delete. Entries outlive the project they
/// describe and are never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub project_id: ProjectId,
    pub project_title: String,
    pub action: HistoryAction,
    pub details: String,
    pub performed_by: UserId,
    pub performed_by_role: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn record(
        project: &Project,
        action: HistoryAction,
        caller: &Caller,
        now: DateTime<Utc>,
    ) -> Self {
        let details = match action {
            HistoryAction::Closed => "Project was closed",
            HistoryAction::Deleted => "Project was permanently deleted",
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project.id.clone(),
            project_title: project.title.clone(),
            action,
            details: details.to_string(),
            performed_by: caller.id.clone(),
            performed_by_role: caller.audit_role(),
            created_at: now,
        }
    }
}
