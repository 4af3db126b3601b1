//! Cache trait for storing probe responses.
//!
//! This module defines the [`ProbeCache`] trait, keyed by the full
//! [`FetchRequest`] (identifier, fiscal year, report period, consolidation).

use async_trait::async_trait;
use std::time::Duration;

use crate::{
    error::Result,
    types::{FetchRequest, RawRow},
};

/// Trait for caching raw probe responses between lookups.
///
/// Only successful responses are stored; an empty vector is a valid cached
/// answer meaning "the service had nothing for this combination".
#[async_trait]
pub trait ProbeCache: Send + Sync {
    /// Retrieves the cached rows for a probe.
    ///
    /// Returns `Ok(Some(rows))` if cached, `Ok(None)` if not cached.
    async fn get(&self, request: &FetchRequest) -> Result<Option<Vec<RawRow>>>;

    /// Stores the rows returned for a probe.
    async fn put(&self, request: &FetchRequest, rows: &[RawRow]) -> Result<()>;

    /// Removes cache entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
