//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::Utc;
use finstate_core::{FetchRequest, ProbeCache, RawRow, Result};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: chrono::DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Simple in-memory probe cache.
///
/// Entries live in a `RwLock`-protected `HashMap` keyed by the full
/// [`FetchRequest`] and are lost when the cache is dropped.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    probes: RwLock<HashMap<FetchRequest, CacheEntry<Vec<RawRow>>>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached probes.
    pub async fn len(&self) -> usize {
        self.probes.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.probes.read().await.is_empty()
    }
}

#[async_trait]
impl ProbeCache for InMemoryCache {
    #[instrument(skip(self), fields(request = %request))]
    async fn get(&self, request: &FetchRequest) -> Result<Option<Vec<RawRow>>> {
        let cache = self.probes.read().await;
        match cache.get(request) {
            Some(entry) => {
                debug!("Cache hit for probe");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss for probe");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, rows), fields(request = %request, count = rows.len()))]
    async fn put(&self, request: &FetchRequest, rows: &[RawRow]) -> Result<()> {
        let mut cache = self.probes.write().await;
        cache.insert(request.clone(), CacheEntry::new(rows.to_vec()));
        debug!("Cached {} probe rows", rows.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut cache = self.probes.write().await;
        let before = cache.len();
        cache.retain(|_, entry| !entry.is_stale(ttl));
        let removed = before - cache.len();

        if removed > 0 {
            debug!("Invalidated {} stale cache entries", removed);
        }

        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.probes.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}
