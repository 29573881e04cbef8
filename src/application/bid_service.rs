use super::{AppError, AppResult, NotFoundExt, ProjectBids};
use crate::domain::*;
use crate::ports::{BidRepository, Cache, ProjectRepository};
use chrono::Utc;
use std::sync::Arc;

pub struct BidService {
    projects: Arc<dyn ProjectRepository>,
    bids: Arc<dyn BidRepository>,
    cache: Arc<dyn Cache<ProjectId, Project>>,
}

impl BidService {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        bids: Arc<dyn BidRepository>,
        cache: Arc<dyn Cache<ProjectId, Project>>,
    ) -> Self {
        Self {
            projects,
            bids,
            cache,
        }
    }

    /// Places a bid. Any number of bids per bidder is accepted, including
    /// from the project's owner.
    pub async fn submit_bid(
        &self,
        caller: &Caller,
        project_id: &ProjectId,
        draft: BidDraft,
    ) -> AppResult<Bid> {
        let bid = draft.into_bid(project_id.clone(), caller, Utc::now())?;

        // Nothing is written for a project that does not exist
        self.projects
            .get_project(project_id)
            .await
            .or_not_found("Project not found")?;

        let project = self
            .bids
            .place_bid(&bid)
            .await
            .or_not_found("Project not found")?;
        self.cache.insert(project.id.clone(), project).await;

        tracing::info!(project = %project_id, bid = %bid.id, bidder = %caller.id, "Bid placed");
        Ok(bid)
    }

    pub async fn project_bids(
        &self,
        caller: &Caller,
        project_id: &ProjectId,
    ) -> AppResult<ProjectBids> {
        let project = self
            .projects
            .get_project(project_id)
            .await
            .or_not_found("Project not found")?;

        if !project.can_view_bids(caller) {
            return Err(AppError::Forbidden(
                "Not authorized to view bids for this project".to_string(),
            ));
        }

        let bids = self.bids.list_bids(&project.bids).await?;
        Ok(ProjectBids {
            project_id: project.id,
            project_title: project.title,
            bids: bids.iter().map(BidView::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::MokaCacheAdapter;
    use crate::adapters::store::InMemoryStore;
    use crate::domain::project::fixtures::project_for;

    fn setup() -> (Arc<InMemoryStore>, BidService) {
        let store = Arc::new(InMemoryStore::new());
        let service = BidService::new(
            store.clone(),
            store.clone(),
            Arc::new(MokaCacheAdapter::<ProjectId, Project>::new(60, 100)),
        );
        (store, service)
    }

    fn proposal(amount: f64) -> BidDraft {
        BidDraft {
            amount: Some(amount),
            proposal: Some("Two weeks, fixed price".to_string()),
        }
    }

    fn org() -> Caller {
        Caller::new("org-1", Some(Role::Organization))
    }

    #[tokio::test]
    async fn test_bid_on_missing_project_stores_nothing() {
        let (store, service) = setup();
        let caller = Caller::new("d-1", Some(Role::Developer));

        let err = service
            .submit_bid(&caller, &ProjectId::from("missing"), proposal(10.0))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(msg) if msg == "Project not found"));
        assert!(store
            .find_bid(&ProjectId::from("missing"), &caller.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_invalid_bid_is_rejected() {
        let (store, service) = setup();
        let project = project_for(&org());
        store.insert_project(&project).await.unwrap();

        let err = service
            .submit_bid(
                &Caller::new("d-1", Some(Role::Developer)),
                &project.id,
                BidDraft {
                    amount: Some(10.0),
                    proposal: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.get_project(&project.id).await.unwrap().bids.is_empty());
    }

    #[tokio::test]
    async fn test_repeat_bids_keep_submission_order() {
        let (store, service) = setup();
        let project = project_for(&org());
        store.insert_project(&project).await.unwrap();
        let caller = Caller::new("d-1", Some(Role::Developer)).with_name("Ayesha");

        let first = service.submit_bid(&caller, &project.id, proposal(100.0)).await.unwrap();
        let second = service.submit_bid(&caller, &project.id, proposal(90.0)).await.unwrap();

        let listed = service.project_bids(&org(), &project.id).await.unwrap();
        let ids: Vec<_> = listed.bids.iter().map(|b| b.id.clone()).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(listed.bids[0].user_name, "Ayesha");
        assert_eq!(listed.bids[0].user_role, "developer");
    }

    #[tokio::test]
    async fn test_bid_is_linked_and_pending() {
        let (store, service) = setup();
        let project = project_for(&org());
        store.insert_project(&project).await.unwrap();

        let bid = service
            .submit_bid(
                &Caller::new("d-1", Some(Role::Developer)),
                &project.id,
                BidDraft {
                    amount: Some(5000.0),
                    proposal: Some("x".to_string()),
                },
            )
            .await
            .unwrap();

        let stored = store.get_project(&project.id).await.unwrap();
        assert_eq!(stored.bids, vec![bid.id.clone()]);
        assert_eq!(stored.version, project.version + 1);
        assert_eq!(store.get_bid(&bid.id).await.unwrap().status, BidStatus::Pending);
    }

    #[tokio::test]
    async fn test_owner_may_bid_on_own_project() {
        let (store, service) = setup();
        let project = project_for(&org());
        store.insert_project(&project).await.unwrap();

        tokio_test::assert_ok!(service.submit_bid(&org(), &project.id, proposal(1.0)).await);
    }

    #[tokio::test]
    async fn test_bid_visibility() {
        let (store, service) = setup();
        let mut project = project_for(&org());
        project.assigned_developer = Some("d-9".into());
        store.insert_project(&project).await.unwrap();

        let stranger = Caller::new("d-1", Some(Role::Developer));
        assert!(matches!(
            service.project_bids(&stranger, &project.id).await,
            Err(AppError::Forbidden(_))
        ));

        let assignee = Caller::new("d-9", Some(Role::Developer));
        tokio_test::assert_ok!(service.project_bids(&assignee, &project.id).await);

        let wrong_role_owner = Caller::new("org-1", Some(Role::Student));
        assert!(service.project_bids(&wrong_role_owner, &project.id).await.is_err());

        let any_role_owner = Caller::new("org-1", None);
        assert!(service.project_bids(&any_role_owner, &project.id).await.is_ok());

        assert!(matches!(
            service.project_bids(&assignee, &ProjectId::from("nope")).await,
            Err(AppError::NotFound(_))
        ));
    }
}
