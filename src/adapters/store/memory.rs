//! In-process document store.
//!
//! Each collection is a concurrent map. Project writes are guarded by the
//! version counter on the document: a write built from a stale read is
//! refused instead of silently overwriting a newer one.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{
    Bid, BidId, BidStatus, HistoryEntry, Project, ProjectId, ProjectQuery, UserId,
};
use crate::ports::{
    BidRepository, HistoryRepository, ProjectRepository, RepositoryError, RepositoryResult,
};

#[derive(Default)]
pub struct InMemoryStore {
    projects: DashMap<ProjectId, Project>,
    bids: DashMap<BidId, Bid>,
    history: DashMap<ProjectId, Vec<HistoryEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn insert_project(&self, project: &Project) -> RepositoryResult<()> {
        if self.projects.contains_key(&project.id) {
            return Err(RepositoryError::Storage(format!(
                "duplicate project id {}",
                project.id
            )));
        }
        self.projects.insert(project.id.clone(), project.clone());
        Ok(())
    }

    async fn get_project(&self, id: &ProjectId) -> RepositoryResult<Project> {
        self.projects
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RepositoryError::NotFound(format!("project {id}")))
    }

    async fn list_projects(&self, query: &ProjectQuery) -> RepositoryResult<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .projects
            .iter()
            .filter(|entry| query.filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        projects.sort_by(|a, b| query.sort.compare(a, b));
        tracing::debug!("Project query matched {} documents", projects.len());
        Ok(projects)
    }

    async fn update_project(&self, project: &Project) -> RepositoryResult<Project> {
        let mut stored = self
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("project {}", project.id)))?;

        if stored.version != project.version {
            return Err(RepositoryError::Conflict {
                id: project.id.clone(),
                expected: project.version,
                found: stored.version,
            });
        }

        let mut next = project.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn delete_project(&self, id: &ProjectId) -> RepositoryResult<Project> {
        self.projects
            .remove(id)
            .map(|(_, project)| project)
            .ok_or_else(|| RepositoryError::NotFound(format!("project {id}")))
    }
}

#[async_trait]
impl BidRepository for InMemoryStore {
    async fn get_bid(&self, id: &BidId) -> RepositoryResult<Bid> {
        self.bids
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RepositoryError::NotFound(format!("bid {id}")))
    }

    async fn find_bid(
        &self,
        project: &ProjectId,
        bidder: &UserId,
    ) -> RepositoryResult<Option<Bid>> {
        Ok(self
            .bids
            .iter()
            .filter(|entry| &entry.project_id == project && &entry.bidder_id == bidder)
            .map(|entry| entry.value().clone())
            .min_by_key(|bid| bid.created_at))
    }

    async fn list_bids(&self, ids: &[BidId]) -> RepositoryResult<Vec<Bid>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.bids.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn place_bid(&self, bid: &Bid) -> RepositoryResult<Project> {
        // The project entry stays locked until the bid is linked
        let mut project = self
            .projects
            .get_mut(&bid.project_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("project {}", bid.project_id)))?;

        self.bids.insert(bid.id.clone(), bid.clone());
        project.bids.push(bid.id.clone());
        project.version += 1;

        Ok(project.clone())
    }

    async fn set_bid_status(&self, id: &BidId, status: BidStatus) -> RepositoryResult<Bid> {
        let mut bid = self
            .bids
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("bid {id}")))?;
        bid.status = status;
        Ok(bid.clone())
    }
}

#[async_trait]
impl HistoryRepository for InMemoryStore {
    async fn append_history(&self, entry: &HistoryEntry) -> RepositoryResult<()> {
        self.history
            .entry(entry.project_id.clone())
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn list_history(&self, project: &ProjectId) -> RepositoryResult<Vec<HistoryEntry>> {
        Ok(self
            .history
            .get(project)
            .map(|entries| entries.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::fixtures::project_for;
    use crate::domain::{
        BidDraft, Caller, HistoryAction, ProjectFilter, ProjectSort, ProjectStatus, Role,
    };
    use chrono::{Duration, Utc};

    fn org() -> Caller {
        Caller::new("org", Some(Role::Organization))
    }

    fn bid_for(project: &Project, bidder: &str) -> Bid {
        BidDraft {
            amount: Some(100.0),
            proposal: Some("x".to_string()),
        }
        .into_bid(
            project.id.clone(),
            &Caller::new(bidder, Some(Role::Developer)),
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_stale_write_is_rejected() {
        let store = InMemoryStore::new();
        let project = project_for(&org());
        store.insert_project(&project).await.unwrap();

        let mut first = store.get_project(&project.id).await.unwrap();
        let mut second = first.clone();

        first.title = "First".to_string();
        let saved = store.update_project(&first).await.unwrap();
        assert_eq!(saved.version, 1);

        second.title = "Second".to_string();
        let err = store.update_project(&second).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Conflict {
                expected: 0,
                found: 1,
                ..
            }
        ));
        assert_eq!(store.get_project(&project.id).await.unwrap().title, "First");
    }

    #[tokio::test]
    async fn test_place_bid_links_bid_to_project() {
        let store = InMemoryStore::new();
        let project = project_for(&org());
        store.insert_project(&project).await.unwrap();

        let bid = bid_for(&project, "dev");
        let updated = store.place_bid(&bid).await.unwrap();

        assert_eq!(updated.bids, vec![bid.id.clone()]);
        assert_eq!(updated.version, project.version + 1);
        assert_eq!(store.get_bid(&bid.id).await.unwrap(), bid);
        assert_eq!(
            store.find_bid(&project.id, &"dev".into()).await.unwrap(),
            Some(bid)
        );
        assert_eq!(
            store.find_bid(&project.id, &"nobody".into()).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_place_bid_on_missing_project_stores_nothing() {
        let store = InMemoryStore::new();
        let project = project_for(&org());
        let bid = bid_for(&project, "dev");

        let err = store.place_bid(&bid).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
        assert!(store.get_bid(&bid.id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_projects_filters_and_sorts() {
        let store = InMemoryStore::new();
        let mut older = project_for(&org());
        older.created_at = Utc::now() - Duration::days(1);
        let newer = project_for(&org());
        let mut closed = project_for(&org());
        closed.status = ProjectStatus::Closed;

        for p in [&older, &newer, &closed] {
            store.insert_project(p).await.unwrap();
        }

        let query = ProjectQuery::new(
            ProjectFilter::StatusIn(vec![ProjectStatus::Open]),
            ProjectSort::Newest,
        );
        let ids: Vec<_> = store
            .list_projects(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_history_is_kept_after_delete() {
        let store = InMemoryStore::new();
        let project = project_for(&org());
        store.insert_project(&project).await.unwrap();

        store.delete_project(&project.id).await.unwrap();
        let entry = HistoryEntry::record(&project, HistoryAction::Deleted, &org(), Utc::now());
        store.append_history(&entry).await.unwrap();

        assert!(store.get_project(&project.id).await.is_err());
        assert_eq!(store.list_history(&project.id).await.unwrap(), vec![entry]);
    }
}
