//! Resolve-then-fetch pipeline.

use std::sync::Arc;
use std::time::Duration;

use finstate_core::{CorporateDirectoryEntry, FetchResult, ProbeCache, Result, StatementQuery};
use tracing::{debug, info, warn};

use crate::{
    cached::CachedQuery,
    fetcher::{FetchPolicy, fetch},
    resolver::resolve_entry,
};

/// Outcome of a company lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// No directory entry matches the name.
    CompanyNotFound {
        /// The name that was searched for.
        name: String,
    },
    /// The company exists but no probe returned a sufficient statement.
    NoStatement {
        /// The resolved directory entry.
        entry: CorporateDirectoryEntry,
        /// The empty sweep result.
        result: FetchResult,
    },
    /// Statements were found.
    Found {
        /// The resolved directory entry.
        entry: CorporateDirectoryEntry,
        /// The accepted statements.
        result: FetchResult,
    },
}

impl Lookup {
    /// Returns the statements if any were found.
    #[must_use]
    pub const fn result(&self) -> Option<&FetchResult> {
        match self {
            Self::Found { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Returns true if statements were found.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Looks up financial statements by company name.
///
/// ```rust,ignore
/// use finstate::{DartClient, StatementService, FetchPolicy};
/// use std::sync::Arc;
///
/// let client = DartClient::new(api_key)?;
/// let directory = client.fetch_directory().await?;
/// let service = StatementService::new(Arc::new(client))
///     .with_policy(FetchPolicy::default().with_min_rows(10));
///
/// let lookup = service.lookup(&directory, "삼성전자", 2023).await?;
/// ```
pub struct StatementService {
    query: Arc<dyn StatementQuery>,
    policy: FetchPolicy,
    cache: Option<Arc<dyn ProbeCache>>,
    cache_ttl: Option<Duration>,
}

impl std::fmt::Debug for StatementService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementService")
            .field("query", &self.query.name())
            .field("policy", &self.policy)
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl StatementService {
    /// Creates a service over `query` with the default policy and no cache.
    #[must_use]
    pub fn new(query: Arc<dyn StatementQuery>) -> Self {
        Self {
            query,
            policy: FetchPolicy::default(),
            cache: None,
            cache_ttl: None,
        }
    }

    /// Sets the probe policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Caches probe responses in `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ProbeCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Drops cached probes older than `ttl` before each fetch.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Returns the active probe policy.
    #[must_use]
    pub const fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Fetches statements for an already-resolved identifier.
    ///
    /// # Errors
    /// Returns [`FinstateError::Unavailable`](finstate_core::FinstateError::Unavailable)
    /// if every probe failed.
    pub async fn fetch(&self, identifier: &str, fiscal_year: i32) -> Result<FetchResult> {
        let result = match &self.cache {
            Some(cache) => {
                if let Some(ttl) = self.cache_ttl {
                    match cache.invalidate_stale(ttl).await {
                        Ok(0) => {}
                        Ok(removed) => debug!(removed, "Dropped stale cached probes"),
                        Err(e) => warn!(error = %e, "Cache invalidation failed"),
                    }
                }
                let query = CachedQuery::new(Arc::clone(&self.query), Arc::clone(cache));
                fetch(identifier, fiscal_year, &query, &self.policy).await?
            }
            None => fetch(identifier, fiscal_year, self.query.as_ref(), &self.policy).await?,
        };
        Ok(result)
    }

    /// Resolves `name` against `directory` and fetches its statements.
    ///
    /// A missing company or an empty sweep is a [`Lookup`] variant, not an error.
    ///
    /// # Errors
    /// Returns [`FinstateError::Unavailable`](finstate_core::FinstateError::Unavailable)
    /// if every probe failed.
    pub async fn lookup(
        &self,
        directory: &[CorporateDirectoryEntry],
        name: &str,
        fiscal_year: i32,
    ) -> Result<Lookup> {
        let Some(entry) = resolve_entry(name, directory) else {
            info!(name, "Company not found in directory");
            return Ok(Lookup::CompanyNotFound {
                name: name.to_string(),
            });
        };

        debug!(
            corp_code = %entry.identifier,
            fiscal_year,
            source = self.query.name(),
            "Looking up statements"
        );
        let result = self.fetch(&entry.identifier, fiscal_year).await?;
        let entry = entry.clone();

        if result.sufficient {
            Ok(Lookup::Found { entry, result })
        } else {
            info!(corp_code = %entry.identifier, fiscal_year, "No statement found");
            Ok(Lookup::NoStatement { entry, result })
        }
    }
}
