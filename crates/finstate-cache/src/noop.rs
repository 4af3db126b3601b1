//! No-op cache implementation.

use async_trait::async_trait;
use finstate_core::{FetchRequest, ProbeCache, RawRow, Result};
use std::time::Duration;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get` always returns `Ok(None)` and `put` always returns `Ok(())`.
/// Useful for disabling caching without changing call sites.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProbeCache for NoopCache {
    async fn get(&self, _request: &FetchRequest) -> Result<Option<Vec<RawRow>>> {
        trace!("NoopCache: get called, returning None");
        Ok(None)
    }

    async fn put(&self, _request: &FetchRequest, _rows: &[RawRow]) -> Result<()> {
        trace!("NoopCache: put called, doing nothing");
        Ok(())
    }

    async fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finstate_core::{Consolidation, ReportPeriod};

    #[tokio::test]
    async fn test_noop_never_hits() {
        let cache = NoopCache::new();
        let request = FetchRequest::new("00126380", 2023, ReportPeriod::Q1, Consolidation::Separate);

        cache
            .put(&request, &[RawRow::new().with("sj_div", "BS")])
            .await
            .unwrap();
        assert!(cache.get(&request).await.unwrap().is_none());
        assert_eq!(cache.invalidate_stale(Duration::ZERO).await.unwrap(), 0);
    }
}
