//! Read-side views over projects: developer history, dashboards and
//! invoices. Nothing here writes.

use super::{AppError, AppResult, NotFoundExt};
use crate::domain::*;
use crate::ports::{AppConfig, BidRepository, ProjectRepository, RepositoryError};
use std::sync::Arc;

const PAID_OR_RELEASED: [PaymentStatus; 2] = [PaymentStatus::Paid, PaymentStatus::Released];

pub struct ReportService {
    projects: Arc<dyn ProjectRepository>,
    bids: Arc<dyn BidRepository>,
    fee_rate: f64,
    currency: String,
}

impl ReportService {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        bids: Arc<dyn BidRepository>,
        config: &AppConfig,
    ) -> Self {
        Self {
            projects,
            bids,
            fee_rate: config.platform_fee_rate,
            currency: config.currency.clone(),
        }
    }

    /// Everything the caller worked on or posted as a developer.
    pub async fn developer_history(
        &self,
        caller: &Caller,
    ) -> AppResult<(Vec<Project>, ProjectStats)> {
        let projects = self
            .query(worked_on_or_posted(&caller.id), ProjectSort::RecentlyUpdated)
            .await?;
        let stats = ProjectStats::compute(&projects, &caller.id, EarningsRule::ReleasedToAssignee);
        Ok((projects, stats))
    }

    pub async fn assigned_projects(
        &self,
        caller: &Caller,
    ) -> AppResult<(Vec<Project>, ProjectStats)> {
        let projects = self
            .query(
                ProjectFilter::AssignedTo(caller.id.clone()),
                ProjectSort::RecentlyUpdated,
            )
            .await?;
        let stats = ProjectStats::compute(&projects, &caller.id, EarningsRule::PaidOrReleased);
        Ok((projects, stats))
    }

    pub async fn active_projects(&self, caller: &Caller) -> AppResult<Vec<Project>> {
        let filter = ProjectFilter::All(vec![
            ProjectFilter::Any(vec![
                ProjectFilter::OwnedBy(OwnerScope::AnyKind(caller.id.clone())),
                ProjectFilter::AssignedTo(caller.id.clone()),
            ]),
            ProjectFilter::StatusIn(vec![
                ProjectStatus::InProgress,
                ProjectStatus::Submitted,
                ProjectStatus::Rejected,
            ]),
        ]);
        self.query(filter, ProjectSort::RecentlyAssigned).await
    }

    /// Projects the caller owes, or has paid, money on.
    pub async fn invoice_projects(&self, caller: &Caller) -> AppResult<Vec<Project>> {
        let filter = ProjectFilter::All(vec![
            ProjectFilter::OwnedBy(OwnerScope::for_caller(caller)),
            ProjectFilter::Any(vec![
                ProjectFilter::All(vec![
                    ProjectFilter::StatusIn(vec![ProjectStatus::Assigned]),
                    ProjectFilter::PaymentIn(vec![PaymentStatus::Pending]),
                ]),
                ProjectFilter::All(vec![
                    ProjectFilter::StatusIn(vec![
                        ProjectStatus::InProgress,
                        ProjectStatus::Completed,
                    ]),
                    ProjectFilter::PaymentIn(PAID_OR_RELEASED.to_vec()),
                ]),
            ]),
        ]);
        self.query(filter, ProjectSort::RecentlyUpdated).await
    }

    /// Paid work on the developer side.
    pub async fn find_work_invoices(&self, caller: &Caller) -> AppResult<Vec<Project>> {
        let filter = ProjectFilter::All(vec![
            worked_on_or_posted(&caller.id),
            ProjectFilter::StatusIn(vec![ProjectStatus::Completed, ProjectStatus::InProgress]),
            ProjectFilter::PaymentIn(PAID_OR_RELEASED.to_vec()),
        ]);
        self.query(filter, ProjectSort::RecentlyUpdated).await
    }

    pub async fn assigned_by_me(&self, caller: &Caller) -> AppResult<Vec<Project>> {
        let filter = ProjectFilter::All(vec![
            ProjectFilter::OwnedBy(OwnerScope::for_caller(caller)),
            ProjectFilter::StatusIn(vec![
                ProjectStatus::InProgress,
                ProjectStatus::Submitted,
                ProjectStatus::Rejected,
                ProjectStatus::Completed,
            ]),
            ProjectFilter::PaymentIn(PAID_OR_RELEASED.to_vec()),
        ]);
        self.query(filter, ProjectSort::Newest).await
    }

    pub async fn invoice(&self, caller: &Caller, id: &ProjectId) -> AppResult<Invoice> {
        let project = self
            .projects
            .get_project(id)
            .await
            .or_not_found("Project not found")?;

        if !project.is_assigned_to(&caller.id) && !project.is_owned_by(&caller.id) {
            tracing::warn!(project = %id, caller = %caller.id, "Rejected invoice download");
            return Err(AppError::Forbidden(
                "Not authorized to download this invoice".to_string(),
            ));
        }

        let accepted_bid = match &project.accepted_bid {
            Some(bid_id) => match self.bids.get_bid(bid_id).await {
                Ok(bid) => Some(bid),
                Err(RepositoryError::NotFound(_)) => None,
                Err(e) => return Err(e.into()),
            },
            None => None,
        };

        Ok(Invoice::for_project(
            &project,
            accepted_bid.as_ref(),
            self.fee_rate,
            &self.currency,
        ))
    }

    async fn query(&self, filter: ProjectFilter, sort: ProjectSort) -> AppResult<Vec<Project>> {
        Ok(self
            .projects
            .list_projects(&ProjectQuery::new(filter, sort))
            .await?)
    }
}

fn worked_on_or_posted(user: &UserId) -> ProjectFilter {
    ProjectFilter::Any(vec![
        ProjectFilter::AssignedTo(user.clone()),
        ProjectFilter::PostedByDeveloper(user.clone()),
    ])
}
