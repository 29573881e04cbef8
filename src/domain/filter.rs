use std::cmp::Ordering;

use serde::Deserialize;

use super::{OwnerScope, PaymentStatus, Project, ProjectStatus, UserId};

/// Predicate over projects, evaluated by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectFilter {
    All(Vec<ProjectFilter>),
    Any(Vec<ProjectFilter>),
    OwnedBy(OwnerScope),
    /// Owner id differs from the user, whatever the owner kind.
    NotOwnedBy(UserId),
    /// Developer-kind owner with this id.
    PostedByDeveloper(UserId),
    AssignedTo(UserId),
    StatusIn(Vec<ProjectStatus>),
    StatusNot(ProjectStatus),
    PaymentIn(Vec<PaymentStatus>),
    Visible,
    /// Case-insensitive substring over title, description and skills.
    Text(String),
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        match self {
            ProjectFilter::All(filters) => filters.iter().all(|f| f.matches(project)),
            ProjectFilter::Any(filters) => filters.iter().any(|f| f.matches(project)),
            ProjectFilter::OwnedBy(scope) => scope.matches(&project.owner),
            ProjectFilter::NotOwnedBy(user) => !project.is_owned_by(user),
            ProjectFilter::PostedByDeveloper(user) => project.owner.developer_id() == Some(user),
            ProjectFilter::AssignedTo(user) => project.is_assigned_to(user),
            ProjectFilter::StatusIn(statuses) => statuses.contains(&project.status),
            ProjectFilter::StatusNot(status) => project.status != *status,
            ProjectFilter::PaymentIn(statuses) => statuses.contains(&project.payment_status),
            ProjectFilter::Visible => project.is_visible,
            ProjectFilter::Text(query) => text_matches(project, query),
        }
    }
}

fn text_matches(project: &Project, query: &str) -> bool {
    let query_lower = query.trim().to_lowercase();
    if query_lower.is_empty() {
        return true;
    }

    project.title.to_lowercase().contains(&query_lower)
        || project.description.to_lowercase().contains(&query_lower)
        || project
            .skills
            .iter()
            .any(|skill| skill.to_lowercase().contains(&query_lower))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSort {
    #[default]
    Newest,
    RecentlyUpdated,
    RecentlyAssigned,
    BudgetDesc,
    BudgetAsc,
    Deadline,
}

impl ProjectSort {
    pub fn compare(self, a: &Project, b: &Project) -> Ordering {
        match self {
            ProjectSort::Newest => b.created_at.cmp(&a.created_at),
            ProjectSort::RecentlyUpdated => b.updated_at.cmp(&a.updated_at),
            // Unassigned projects go last
            ProjectSort::RecentlyAssigned => b.assigned_date.cmp(&a.assigned_date),
            ProjectSort::BudgetDesc => b.budget.total_cmp(&a.budget),
            ProjectSort::BudgetAsc => a.budget.total_cmp(&b.budget),
            ProjectSort::Deadline => a.deadline.cmp(&b.deadline),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectQuery {
    pub filter: ProjectFilter,
    pub sort: ProjectSort,
}

impl ProjectQuery {
    pub fn new(filter: ProjectFilter, sort: ProjectSort) -> Self {
        Self { filter, sort }
    }
}
