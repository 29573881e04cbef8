use std::sync::Arc;

use super::{BidService, ProjectService, ReportService};
use crate::adapters::cache::MokaCacheAdapter;
use crate::adapters::notify::InMemoryNotifier;
use crate::adapters::store::InMemoryStore;
use crate::domain::{Notification, Project, ProjectId, UserId};
use crate::ports::{
    AppConfig, BidRepository, Cache, HistoryRepository, Notifier, ProjectRepository,
};

/// Everything a request handler needs, shared across the server.
#[derive(Clone)]
pub struct Marketplace {
    pub projects: Arc<ProjectService>,
    pub bids: Arc<BidService>,
    pub reports: Arc<ReportService>,
    notifier: Arc<dyn Notifier>,
}

impl Marketplace {
    pub fn new<S>(store: Arc<S>, notifier: Arc<dyn Notifier>, config: &AppConfig) -> Self
    where
        S: ProjectRepository + BidRepository + HistoryRepository + 'static,
    {
        let project_cache: Arc<dyn Cache<ProjectId, Project>> =
            Arc::new(MokaCacheAdapter::<ProjectId, Project>::from_config(config));

        let projects = Arc::new(ProjectService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            notifier.clone(),
            project_cache.clone(),
            config.clone(),
        ));
        let bids = Arc::new(BidService::new(store.clone(), store.clone(), project_cache));
        let reports = Arc::new(ReportService::new(store.clone(), store, config));

        Self {
            projects,
            bids,
            reports,
            notifier,
        }
    }

    /// Process-local store and inbox.
    pub fn in_memory(config: &AppConfig) -> Self {
        tracing::info!("Using in-memory store");
        Self::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryNotifier::new()),
            config,
        )
    }

    pub async fn notifications(&self, user: &UserId) -> Vec<Notification> {
        self.notifier.notifications_for(user).await
    }
}
