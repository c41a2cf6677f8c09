//! Time-bounded cache for upstream API responses

use cached::{Cached, TimedCache};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Thread-safe cache whose entries expire after a fixed lifespan
///
/// Clones share the same storage.
pub struct TtlCache<K, V> {
    inner: Arc<Mutex<TimedCache<K, V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    /// Create a cache with the given entry lifespan
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a live entry
    pub async fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().await.cache_get(key).cloned()
    }

    /// Insert or replace an entry
    pub async fn insert(&self, key: K, value: V) {
        self.inner.lock().await.cache_set(key, value);
    }

    /// Return the cached value or compute, store and return a fresh one
    ///
    /// Failed fetches are not cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!(key = ?key, "Cache hit");
            return Ok(value);
        }

        tracing::debug!(key = ?key, "Cache miss");
        let value = fetcher().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Number of stored entries, including ones not yet evicted
    pub async fn len(&self) -> usize {
        self.inner.lock().await.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.inner.lock().await.cache_clear();
    }
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
