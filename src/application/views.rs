use serde::Serialize;

use crate::domain::{BidView, Project, ProjectId, ProjectStats, UserId};

/// A project as returned to clients: the stored document, the legacy
/// per-role owner field, and its bids in display shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub created_by: &'static str,
    pub bids: Vec<BidView>,
}

impl ProjectView {
    pub fn new(project: Project, bids: Vec<BidView>) -> Self {
        Self {
            company_id: project.owner.company_id().cloned(),
            developer_id: project.owner.developer_id().cloned(),
            user_id: project.owner.student_id().cloned(),
            created_by: project.owner.label(),
            project,
            bids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBids {
    pub project_id: ProjectId,
    pub project_title: String,
    pub bids: Vec<BidView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectsWithStats {
    pub projects: Vec<ProjectView>,
    pub stats: ProjectStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::fixtures::project_for;
    use crate::domain::{Caller, Role};

    #[test]
    fn test_view_exposes_only_matching_owner_field() {
        let project = project_for(&Caller::new("org-1", Some(Role::Organization)));
        let json = serde_json::to_value(ProjectView::new(project, Vec::new())).unwrap();

        assert_eq!(json["companyId"], "org-1");
        assert!(json.get("developerId").is_none());
        assert!(json.get("userId").is_none());
        assert_eq!(json["createdBy"], "Organization");
        assert_eq!(json["owner"]["kind"], "organization");
        assert_eq!(json["status"], "open");
        assert_eq!(json["type"], "Full Stack Project");
        assert_eq!(json["bids"], serde_json::json!([]));
    }
}
