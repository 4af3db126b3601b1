//! Error types for statement lookups.
//!
//! [`FinstateError`] covers everything that can go wrong while talking to the
//! disclosure API, reading the corporate directory or touching the probe cache.
//! [`FetchError`] is the aggregated failure of a whole probe sweep.

use thiserror::Error;

use crate::types::FetchRequest;

/// Errors that can occur while querying, parsing or caching statement data.
#[derive(Error, Debug)]
pub enum FinstateError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request limit exceeded on the remote service.
    #[error("Rate limited by {provider}: {message}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Message returned by the provider.
        message: String,
    },

    /// The remote service answered with a non-success status code.
    #[error("API error {status}: {message}")]
    Api {
        /// Provider status code.
        status: String,
        /// Provider status message.
        message: String,
    },

    /// The API key was rejected.
    #[error("Authentication failed for provider {provider}: {message}")]
    AuthenticationFailed {
        /// The provider that rejected the key.
        provider: String,
        /// Message returned by the provider.
        message: String,
    },

    /// Error parsing data returned by a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local I/O failure (reading a directory file, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Every probe of a sweep failed.
    #[error(transparent)]
    Unavailable(#[from] FetchError),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`FinstateError`].
pub type Result<T> = std::result::Result<T, FinstateError>;

/// Error raised by a single probe's query.
pub type QueryError = FinstateError;

/// A probe sweep in which every combination failed to reach the service.
///
/// This is distinct from a sweep that reached the service but found no
/// sufficient statement, which is reported as an empty result.
#[derive(Error, Debug)]
#[error("statement service unavailable: all {} probes failed (last: {})", .failures.len(), last_message(.failures))]
pub struct FetchError {
    /// Each attempted request paired with the error it produced, in probe order.
    pub failures: Vec<(FetchRequest, QueryError)>,
}

impl FetchError {
    /// Creates an aggregated error from the per-probe failures.
    #[must_use]
    pub const fn new(failures: Vec<(FetchRequest, QueryError)>) -> Self {
        Self { failures }
    }

    /// Number of probes that failed.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.failures.len()
    }

    /// The error raised by the last probe, if any.
    #[must_use]
    pub fn last(&self) -> Option<&QueryError> {
        self.failures.last().map(|(_, e)| e)
    }
}

fn last_message(failures: &[(FetchRequest, QueryError)]) -> String {
    failures
        .last()
        .map_or_else(|| "none".to_string(), |(_, e)| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::{Consolidation, ReportPeriod};

    #[test]
    fn test_fetch_error_display_mentions_last_failure() {
        let request =
            FetchRequest::new("00126380", 2023, ReportPeriod::Annual, Consolidation::Separate);
        let err = FetchError::new(vec![(request, FinstateError::Network("timed out".into()))]);
        let message = err.to_string();
        assert!(message.contains("all 1 probes failed"));
        assert!(message.contains("timed out"));
        assert_eq!(err.attempts(), 1);
    }

    #[test]
    fn test_unavailable_wraps_fetch_error() {
        let err: FinstateError = FetchError::new(Vec::new()).into();
        assert!(matches!(err, FinstateError::Unavailable(_)));
        assert!(err.to_string().contains("last: none"));
    }
}
