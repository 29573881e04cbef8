use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use std::hash::Hash;
use std::time::Duration;

use crate::ports::{AppConfig, Cache};

pub struct MokaCacheAdapter<K, V> {
    inner: MokaCache<K, V>,
}

impl<K, V> MokaCacheAdapter<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        Self { inner: cache }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.cache_ttl_seconds, config.cache_capacity)
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for MokaCacheAdapter<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key).await
    }

    async fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value).await;
    }

    async fn remove(&self, key: &K) {
        self.inner.invalidate(key).await;
    }
}
