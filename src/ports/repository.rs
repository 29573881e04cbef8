use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Bid, BidId, BidStatus, HistoryEntry, Project, ProjectId, ProjectQuery, UserId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Project {id} was modified concurrently (expected version {expected}, found {found})")]
    Conflict {
        id: ProjectId,
        expected: u64,
        found: u64,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn insert_project(&self, project: &Project) -> RepositoryResult<()>;
    async fn get_project(&self, id: &ProjectId) -> RepositoryResult<Project>;
    async fn list_projects(&self, query: &ProjectQuery) -> RepositoryResult<Vec<Project>>;

    /// Writes `project` only if the stored version still equals
    /// `project.version`. Returns the stored copy with the bumped version.
    async fn update_project(&self, project: &Project) -> RepositoryResult<Project>;

    async fn delete_project(&self, id: &ProjectId) -> RepositoryResult<Project>;
}

#[async_trait]
pub trait BidRepository: Send + Sync {
    async fn get_bid(&self, id: &BidId) -> RepositoryResult<Bid>;

    /// First bid on `project` placed by `bidder`, in submission order.
    async fn find_bid(&self, project: &ProjectId, bidder: &UserId)
        -> RepositoryResult<Option<Bid>>;

    /// Bids for the given ids, in the order given. Unknown ids are skipped.
    async fn list_bids(&self, ids: &[BidId]) -> RepositoryResult<Vec<Bid>>;

    /// Stores `bid` and appends its id to the owning project's bid list as
    /// one operation. Fails with `NotFound` and stores nothing when the
    /// project is gone.
    async fn place_bid(&self, bid: &Bid) -> RepositoryResult<Project>;

    async fn set_bid_status(&self, id: &BidId, status: BidStatus) -> RepositoryResult<Bid>;
}

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn append_history(&self, entry: &HistoryEntry) -> RepositoryResult<()>;

    /// Entries for `project`, oldest first.
    async fn list_history(&self, project: &ProjectId) -> RepositoryResult<Vec<HistoryEntry>>;
}
