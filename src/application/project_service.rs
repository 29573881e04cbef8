use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::{AppError, AppResult, NotFoundExt, ProjectView};
use crate::domain::*;
use crate::ports::{
    AppConfig, BidRepository, Cache, HistoryRepository, Notifier, ProjectRepository,
    RepositoryError,
};

const NOT_FOUND: &str = "Project not found";
const NOT_FOUND_OR_UNAUTHORIZED: &str = "Project not found or unauthorized";

/// Who gets the project and through which bid.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    pub developer: Option<UserId>,
    pub bid: Option<BidId>,
}

pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    bids: Arc<dyn BidRepository>,
    history: Arc<dyn HistoryRepository>,
    notifier: Arc<dyn Notifier>,
    cache: Arc<dyn Cache<ProjectId, Project>>,
    config: AppConfig,
}

impl ProjectService {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        bids: Arc<dyn BidRepository>,
        history: Arc<dyn HistoryRepository>,
        notifier: Arc<dyn Notifier>,
        cache: Arc<dyn Cache<ProjectId, Project>>,
        config: AppConfig,
    ) -> Self {
        Self {
            projects,
            bids,
            history,
            notifier,
            cache,
            config,
        }
    }

    pub async fn create_project(&self, caller: &Caller, draft: ProjectDraft) -> AppResult<Project> {
        let project =
            draft.into_project(caller, &self.config.default_project_type, Utc::now())?;
        self.projects.insert_project(&project).await?;

        info!(project = %project.id, owner = %project.owner.id(), "Project created");
        self.cache.insert(project.id.clone(), project.clone()).await;
        Ok(project)
    }

    pub async fn get_project(&self, id: &ProjectId) -> AppResult<Project> {
        if let Some(project) = self.cache.get(id).await {
            return Ok(project);
        }

        let project = self.projects.get_project(id).await.or_not_found(NOT_FOUND)?;
        self.cache.insert(id.clone(), project.clone()).await;
        Ok(project)
    }

    /// The caller's own postings that are still on the board.
    pub async fn list_my_projects(&self, caller: &Caller) -> AppResult<Vec<Project>> {
        let filter = ProjectFilter::All(vec![
            ProjectFilter::OwnedBy(OwnerScope::for_caller(caller)),
            ProjectFilter::StatusNot(ProjectStatus::Assigned),
            ProjectFilter::Visible,
        ]);
        self.query(filter, ProjectSort::Newest).await
    }

    /// Open projects posted by anyone but the caller.
    pub async fn available_projects(
        &self,
        caller: &Caller,
        search: Option<String>,
        sort: ProjectSort,
    ) -> AppResult<Vec<Project>> {
        let mut clauses = vec![
            ProjectFilter::NotOwnedBy(caller.id.clone()),
            ProjectFilter::StatusIn(vec![ProjectStatus::Open]),
        ];
        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            clauses.push(ProjectFilter::Text(search));
        }
        self.query(ProjectFilter::All(clauses), sort).await
    }

    pub async fn update_project(
        &self,
        caller: &Caller,
        id: &ProjectId,
        update: ProjectUpdate,
    ) -> AppResult<Project> {
        let mut project = self.projects.get_project(id).await.or_not_found(NOT_FOUND)?;
        if !project.is_owned_by(&caller.id) {
            warn!(project = %id, caller = %caller.id, "Rejected update by non-owner");
            return Err(AppError::Forbidden(
                "Not authorized to update this project".to_string(),
            ));
        }

        project.apply_update(update, Utc::now())?;
        self.save(&project).await
    }

    pub async fn delete_project(&self, caller: &Caller, id: &ProjectId) -> AppResult<()> {
        let project = self
            .projects
            .get_project(id)
            .await
            .or_not_found(NOT_FOUND_OR_UNAUTHORIZED)?;
        if !project.is_owned_by(&caller.id) {
            return Err(AppError::NotFound(NOT_FOUND_OR_UNAUTHORIZED.to_string()));
        }

        self.projects.delete_project(id).await.or_not_found(NOT_FOUND)?;
        self.cache.remove(id).await;
        info!(project = %id, "Project deleted");
        Ok(())
    }

    /// Closes the project, or removes it when `permanent` is set. Either way
    /// one history entry is written.
    pub async fn close_project(
        &self,
        caller: &Caller,
        id: &ProjectId,
        permanent: bool,
    ) -> AppResult<HistoryAction> {
        let mut project = self.projects.get_project(id).await.or_not_found(NOT_FOUND)?;

        if self.config.enforce_close_ownership && !project.is_owned_by(&caller.id) {
            return Err(AppError::Forbidden(
                "Not authorized to close this project".to_string(),
            ));
        }
        if !project.is_owned_by(&caller.id) {
            warn!(project = %id, caller = %caller.id, permanent, "Project closed by non-owner");
        }

        let now = Utc::now();
        let action = if permanent {
            self.projects.delete_project(id).await.or_not_found(NOT_FOUND)?;
            self.cache.remove(id).await;
            HistoryAction::Deleted
        } else {
            project.close(now);
            self.save(&project).await?;
            HistoryAction::Closed
        };

        let entry = HistoryEntry::record(&project, action, caller, now);
        self.history.append_history(&entry).await?;

        info!(project = %id, ?action, "Project closed");
        Ok(action)
    }

    pub async fn assign_project(
        &self,
        caller: &Caller,
        id: &ProjectId,
        assignment: Assignment,
    ) -> AppResult<Project> {
        let mut project = self.projects.get_project(id).await.or_not_found(NOT_FOUND)?;

        if !project.is_owned_by(&caller.id) {
            warn!(project = %id, caller = %caller.id, "Rejected assignment by non-owner");
            return Err(AppError::Forbidden(
                "Not authorized to assign this project".to_string(),
            ));
        }

        let bid = self.resolve_bid(&project, &assignment).await?.ok_or_else(|| {
            AppError::Validation("No valid bid found for this developer".to_string())
        })?;
        let developer = assignment
            .developer
            .unwrap_or_else(|| bid.bidder_id.clone());
        let previous_bid = project.accepted_bid.clone();

        let now = Utc::now();
        project.assign(developer.clone(), &bid, now);

        // A stored assignment never points at a pending bid
        let superseded = previous_bid.filter(|prev| prev != &bid.id);
        self.settle_bids(&bid, superseded.as_ref()).await?;
        let project = match self.save(&project).await {
            Ok(project) => project,
            Err(e) => {
                warn!(project = %id, bid = %bid.id, "Assignment write failed, restoring bids: {e}");
                self.unsettle_bids(&bid, superseded.as_ref()).await;
                return Err(e);
            }
        };

        info!(project = %id, developer = %developer, bid = %bid.id, "Project assigned");

        let notification = Notification::project_assigned(developer, &project, now);
        if let Err(e) = self.notifier.notify(&notification).await {
            warn!("Failed to notify assigned developer: {e}");
        }

        Ok(project)
    }

    async fn settle_bids(&self, accepted: &Bid, superseded: Option<&BidId>) -> AppResult<()> {
        self.bids.set_bid_status(&accepted.id, BidStatus::Accepted).await?;
        if let Some(previous) = superseded {
            if let Err(e) = self.bids.set_bid_status(previous, BidStatus::Rejected).await {
                self.unsettle_bids(accepted, None).await;
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Puts bids back the way `settle_bids` found them. Best effort.
    async fn unsettle_bids(&self, accepted: &Bid, superseded: Option<&BidId>) {
        if let Err(e) = self.bids.set_bid_status(&accepted.id, accepted.status).await {
            warn!(bid = %accepted.id, "Failed to restore bid status: {e}");
        }
        if let Some(previous) = superseded {
            if let Err(e) = self.bids.set_bid_status(previous, BidStatus::Accepted).await {
                warn!(bid = %previous, "Failed to restore bid status: {e}");
            }
        }
    }

    async fn resolve_bid(
        &self,
        project: &Project,
        assignment: &Assignment,
    ) -> AppResult<Option<Bid>> {
        if let Some(bid_id) = &assignment.bid {
            return match self.bids.get_bid(bid_id).await {
                Ok(bid) if bid.project_id == project.id => Ok(Some(bid)),
                Ok(_) | Err(RepositoryError::NotFound(_)) => Ok(None),
                Err(e) => Err(e.into()),
            };
        }

        match &assignment.developer {
            Some(developer) => Ok(self.bids.find_bid(&project.id, developer).await?),
            None => Ok(None),
        }
    }

    pub async fn update_payment_status(
        &self,
        caller: &Caller,
        id: &ProjectId,
        status: Option<PaymentStatus>,
    ) -> AppResult<Project> {
        let status = status.ok_or_else(|| DomainError::MissingField("paymentStatus".into()))?;
        let mut project = self.owned_project(caller, id).await?;

        project.set_payment_status(status, Utc::now());
        let project = self.save(&project).await?;
        info!(project = %id, %status, project_status = %project.status, "Payment status updated");
        Ok(project)
    }

    pub async fn update_progress(
        &self,
        caller: &Caller,
        id: &ProjectId,
        progress: Option<f64>,
    ) -> AppResult<Project> {
        let progress = progress.ok_or_else(|| DomainError::MissingField("progress".into()))?;
        let mut project = self.owned_project(caller, id).await?;

        project.set_progress(progress, Utc::now())?;
        self.save(&project).await
    }

    pub async fn change_status(
        &self,
        caller: &Caller,
        id: &ProjectId,
        status: Option<ProjectStatus>,
    ) -> AppResult<Project> {
        let status = status.ok_or_else(|| DomainError::MissingField("status".into()))?;
        let mut project = self.projects.get_project(id).await.or_not_found(NOT_FOUND)?;
        let from = project.status;

        project.transition(status, &caller.id, Utc::now())?;
        let project = self.save(&project).await?;
        info!(project = %id, %from, to = %status, "Project status changed");
        Ok(project)
    }

    /// Audit entries for a project. Once the project is gone only callers
    /// who performed one of the recorded actions can still read them.
    pub async fn project_history(
        &self,
        caller: &Caller,
        id: &ProjectId,
    ) -> AppResult<Vec<HistoryEntry>> {
        match self.projects.get_project(id).await {
            Ok(project) => {
                if !project.is_owned_by(&caller.id) && !project.is_assigned_to(&caller.id) {
                    return Err(AppError::Forbidden(
                        "Not authorized to view this project's history".to_string(),
                    ));
                }
                Ok(self.history.list_history(id).await?)
            }
            Err(RepositoryError::NotFound(_)) => {
                let entries = self.history.list_history(id).await?;
                if entries.iter().any(|e| e.performed_by == caller.id) {
                    Ok(entries)
                } else {
                    Err(AppError::NotFound(NOT_FOUND.to_string()))
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn render(&self, project: Project) -> AppResult<ProjectView> {
        let bids = self.bids.list_bids(&project.bids).await?;
        Ok(ProjectView::new(
            project,
            bids.iter().map(BidView::from).collect(),
        ))
    }

    pub async fn render_all(&self, projects: Vec<Project>) -> AppResult<Vec<ProjectView>> {
        let mut views = Vec::with_capacity(projects.len());
        for project in projects {
            views.push(self.render(project).await?);
        }
        Ok(views)
    }

    /// Lookup restricted to the caller's own projects. A project owned by
    /// someone else is reported as missing.
    async fn owned_project(&self, caller: &Caller, id: &ProjectId) -> AppResult<Project> {
        let project = self
            .projects
            .get_project(id)
            .await
            .or_not_found(NOT_FOUND_OR_UNAUTHORIZED)?;

        if OwnerScope::for_caller(caller).matches(&project.owner) {
            Ok(project)
        } else {
            Err(AppError::NotFound(NOT_FOUND_OR_UNAUTHORIZED.to_string()))
        }
    }

    async fn query(&self, filter: ProjectFilter, sort: ProjectSort) -> AppResult<Vec<Project>> {
        Ok(self
            .projects
            .list_projects(&ProjectQuery::new(filter, sort))
            .await?)
    }

    async fn save(&self, project: &Project) -> AppResult<Project> {
        let saved = match self.projects.update_project(project).await {
            Ok(saved) => saved,
            Err(e) => {
                // Whatever we had cached is at best as old as the failed write
                self.cache.remove(&project.id).await;
                return Err(e.into());
            }
        };
        self.cache.insert(saved.id.clone(), saved.clone()).await;
        Ok(saved)
    }
}
