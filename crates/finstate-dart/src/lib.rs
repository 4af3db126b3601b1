#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finstate/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! OpenDART client for financial statements.
//!
//! This crate provides access to the Korean Financial Supervisory Service's
//! electronic disclosure API:
//!
//! - Full single-company financial statements (`fnlttSinglAcntAll`)
//! - The corporate directory (`corpCode.xml`)
//!
//! # Example
//!
//! ```no_run
//! use finstate_dart::DartClient;
//! use finstate_core::{Consolidation, FetchRequest, ReportPeriod, StatementQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DartClient::new("your_api_key")?;
//!
//!     let request = FetchRequest::new("00126380", 2023, ReportPeriod::Annual, Consolidation::Consolidated);
//!     let rows = client.query(&request).await?;
//!     println!("{} rows", rows.len());
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use finstate_core::{
    CorporateDirectoryEntry, DirectorySource, FetchRequest, FinstateError, QueryError, RawRow,
    Result, StatementQuery,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

/// Corporate directory parsing.
pub mod directory;

pub use directory::{CorpCodeFile, parse_corp_code_payload, parse_corp_codes};

/// OpenDART API base URL
const DART_BASE_URL: &str = "https://opendart.fss.or.kr";

/// Provider name used in errors and logs
const PROVIDER: &str = "OpenDART";

/// Default spacing between requests
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Default HTTP timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate limiter to keep requests spaced out
#[derive(Debug)]
struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    const fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// OpenDART API client.
///
/// Implements [`StatementQuery`] for single probes and [`DirectorySource`]
/// for the corporate directory. Requests are spaced by a minimum interval.
#[derive(Clone)]
pub struct DartClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for DartClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DartClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl DartClient {
    /// Create a new client with the given API key (`crtfc_key`).
    ///
    /// # Errors
    /// Returns [`FinstateError::Config`] if the key is blank or the HTTP client
    /// cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| FinstateError::Config(format!("Failed to build HTTP client: {e}")))?;

        let client = Self::with_client(client, api_key);
        if client.api_key.trim().is_empty() {
            return Err(FinstateError::Config("OpenDART API key is empty".to_string()));
        }
        Ok(client)
    }

    /// Create a new client with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(DEFAULT_RATE_LIMIT))),
            api_key: api_key.into(),
            base_url: DART_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host (e.g. a local mirror).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Change the minimum interval between requests.
    #[must_use]
    pub fn with_rate_limit(mut self, min_interval: Duration) -> Self {
        self.rate_limiter = Arc::new(Mutex::new(RateLimiter::new(min_interval)));
        self
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/{endpoint}", self.base_url)
    }

    /// Send a rate-limited GET request, rejecting non-success HTTP statuses.
    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<reqwest::Response> {
        self.rate_limiter.lock().await.wait().await;

        debug!("OpenDART request: {}", endpoint);
        let response = self
            .client
            .get(self.url(endpoint))
            .query(&[("crtfc_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| FinstateError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FinstateError::RateLimited {
                provider: PROVIDER.to_string(),
                message: "HTTP 429".to_string(),
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FinstateError::Network(format!("HTTP {status}: {text}")));
        }

        Ok(response)
    }

    /// Fetch the full financial statements for one probe.
    pub async fn fetch_statement_rows(&self, request: &FetchRequest) -> Result<Vec<RawRow>> {
        let year = request.fiscal_year.to_string();
        let response = self
            .get(
                "fnlttSinglAcntAll.json",
                &[
                    ("corp_code", request.identifier.as_str()),
                    ("bsns_year", year.as_str()),
                    ("reprt_code", request.report_period.dart_code()),
                    ("fs_div", request.consolidation.dart_code()),
                ],
            )
            .await?;

        let text = response
            .text()
            .await
            .map_err(|e| FinstateError::Network(e.to_string()))?;

        let rows = parse_statement_response(&text)?;
        debug!(request = %request, rows = rows.len(), "OpenDART statement response");
        Ok(rows)
    }

    /// Download and parse the corporate directory.
    pub async fn fetch_directory(&self) -> Result<Vec<CorporateDirectoryEntry>> {
        let response = self.get("corpCode.xml", &[]).await?;
        let payload = response
            .bytes()
            .await
            .map_err(|e| FinstateError::Network(e.to_string()))?;

        // Errors come back as a JSON or XML status document instead of a zip.
        if !payload.starts_with(b"PK") {
            if let Ok(envelope) = serde_json::from_slice::<StatusEnvelope>(&payload) {
                check_status(&envelope.status, &envelope.message)?;
            }
            warn!("corpCode.xml did not return an archive; parsing as XML");
        }

        parse_corp_code_payload(&payload)
    }
}

#[async_trait]
impl StatementQuery for DartClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn query(&self, request: &FetchRequest) -> std::result::Result<Vec<RawRow>, QueryError> {
        self.fetch_statement_rows(request).await
    }
}

#[async_trait]
impl DirectorySource for DartClient {
    async fn load_directory(&self) -> Result<Vec<CorporateDirectoryEntry>> {
        self.fetch_directory().await
    }
}

// =============================================================================
// Response handling
// =============================================================================

/// Status code for a successful response.
const STATUS_OK: &str = "000";

/// Status code for "no data for this query".
const STATUS_NO_DATA: &str = "013";

/// Parse a `fnlttSinglAcntAll.json` body into raw rows.
///
/// "No data" is an empty row list, not an error: the caller decides whether
/// that combination was sufficient.
pub fn parse_statement_response(text: &str) -> Result<Vec<RawRow>> {
    let response: StatementResponse = serde_json::from_str(text)
        .map_err(|e| FinstateError::Parse(format!("Failed to parse statement response: {e}")))?;

    if response.status == STATUS_NO_DATA {
        return Ok(Vec::new());
    }
    check_status(&response.status, &response.message)?;

    Ok(response.list.into_iter().map(to_raw_row).collect())
}

/// Map an OpenDART status code to an error.
fn check_status(status: &str, message: &str) -> Result<()> {
    match status {
        STATUS_OK => Ok(()),
        "010" | "011" | "012" | "901" => Err(FinstateError::AuthenticationFailed {
            provider: PROVIDER.to_string(),
            message: message.to_string(),
        }),
        "020" => Err(FinstateError::RateLimited {
            provider: PROVIDER.to_string(),
            message: message.to_string(),
        }),
        "100" | "101" => Err(FinstateError::InvalidParameter(message.to_string())),
        _ => Err(FinstateError::Api {
            status: status.to_string(),
            message: message.to_string(),
        }),
    }
}

/// Convert a JSON row object into a string-valued row.
///
/// Nulls are skipped; numbers and booleans are stringified.
fn to_raw_row(object: Map<String, Value>) -> RawRow {
    object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}

// =============================================================================
// OpenDART Response Types
// =============================================================================

/// Status fields shared by every OpenDART response.
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: String,
    #[serde(default)]
    message: String,
}

/// Response from the full financial statement endpoint.
#[derive(Debug, Deserialize)]
struct StatementResponse {
    /// Status code ("000" on success)
    status: String,
    /// Human-readable status message
    #[serde(default)]
    message: String,
    /// Statement rows
    #[serde(default)]
    list: Vec<Map<String, Value>>,
}

// =============================================================================
// Tests
// =============================================================================
