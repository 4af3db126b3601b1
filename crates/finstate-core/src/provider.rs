//! Collaborator traits.
//!
//! - [`StatementQuery`] - Runs one probe against the statement service
//! - [`DirectorySource`] - Supplies the corporate directory

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::{
    error::{QueryError, Result},
    types::{CorporateDirectoryEntry, FetchRequest, RawRow},
};

/// The network-facing query function behind a probe sweep.
///
/// Implementations return the rows exactly as the service delivered them.
/// "No data for this combination" is an empty vector, not an error.
#[async_trait]
pub trait StatementQuery: Send + Sync + Debug {
    /// Returns the name of the service (e.g., "OpenDART").
    fn name(&self) -> &str;

    /// Runs a single probe.
    async fn query(&self, request: &FetchRequest) -> std::result::Result<Vec<RawRow>, QueryError>;
}

#[async_trait]
impl<T: StatementQuery + ?Sized> StatementQuery for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn query(&self, request: &FetchRequest) -> std::result::Result<Vec<RawRow>, QueryError> {
        (**self).query(request).await
    }
}

#[async_trait]
impl<T: StatementQuery + ?Sized> StatementQuery for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn query(&self, request: &FetchRequest) -> std::result::Result<Vec<RawRow>, QueryError> {
        (**self).query(request).await
    }
}

/// Supplies the corporate directory the resolver searches.
///
/// Refresh cadence and caching are up to the implementation.
#[async_trait]
pub trait DirectorySource: Send + Sync + Debug {
    /// Loads every known directory entry, in the source's own order.
    async fn load_directory(&self) -> Result<Vec<CorporateDirectoryEntry>>;
}
