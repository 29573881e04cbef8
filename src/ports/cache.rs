use async_trait::async_trait;
use std::hash::Hash;

/// Read-through cache in front of a repository. Entries may expire at any
/// time; callers must treat a miss as "go to the store".
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V>;
    async fn insert(&self, key: K, value: V);
    async fn remove(&self, key: &K);
}
