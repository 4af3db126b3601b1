//! Read-through caching for statement queries.

use std::sync::Arc;

use async_trait::async_trait;
use finstate_core::{FetchRequest, ProbeCache, QueryError, RawRow, StatementQuery};
use tracing::{debug, warn};

/// Wraps a [`StatementQuery`] with a [`ProbeCache`].
///
/// Cached responses are served without touching the inner query. Non-empty
/// responses are written back; failures never are. Empty responses usually
/// mean "not filed yet", so they are only stored when
/// [`with_empty_responses`](Self::with_empty_responses) asks for it.
/// Cache errors are logged and otherwise ignored so a broken cache degrades
/// to a cache miss.
pub struct CachedQuery<Q> {
    inner: Q,
    cache: Arc<dyn ProbeCache>,
    store_empty: bool,
}

impl<Q: std::fmt::Debug> std::fmt::Debug for CachedQuery<Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedQuery")
            .field("inner", &self.inner)
            .field("cache", &"configured")
            .field("store_empty", &self.store_empty)
            .finish()
    }
}

impl<Q> CachedQuery<Q> {
    /// Wraps `inner` with `cache`.
    pub fn new(inner: Q, cache: Arc<dyn ProbeCache>) -> Self {
        Self {
            inner,
            cache,
            store_empty: false,
        }
    }

    /// Also caches empty responses.
    #[must_use]
    pub const fn with_empty_responses(mut self, store_empty: bool) -> Self {
        self.store_empty = store_empty;
        self
    }

    /// Returns the wrapped query.
    pub const fn inner(&self) -> &Q {
        &self.inner
    }
}

#[async_trait]
impl<Q: StatementQuery> StatementQuery for CachedQuery<Q> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn query(&self, request: &FetchRequest) -> Result<Vec<RawRow>, QueryError> {
        match self.cache.get(request).await {
            Ok(Some(rows)) => {
                debug!(request = %request, rows = rows.len(), "Serving probe from cache");
                return Ok(rows);
            }
            Ok(None) => {}
            Err(e) => warn!(request = %request, error = %e, "Cache read failed"),
        }

        let rows = self.inner.query(request).await?;
        if rows.is_empty() && !self.store_empty {
            debug!(request = %request, "Not caching empty response");
            return Ok(rows);
        }

        if let Err(e) = self.cache.put(request, &rows).await {
            warn!(request = %request, error = %e, "Cache write failed");
        }
        Ok(rows)
    }
}
