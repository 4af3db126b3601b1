#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finstate/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for financial-statement lookups.
//!
//! This crate provides the foundational abstractions shared by the workspace:
//!
//! - [`StatementQuery`](provider::StatementQuery) - One probe against the statement service
//! - [`DirectorySource`](provider::DirectorySource) - Supplier of the corporate directory
//! - [`ProbeCache`](cache::ProbeCache) - Caching abstraction for probe responses
//! - [`reconcile`](reconcile::reconcile) - Canonicalization of upstream rows

/// Cache trait for storing probe responses.
pub mod cache;
/// Error types for lookups.
pub mod error;
/// Tabular view of fetch results.
mod frame;
/// Report period and consolidation scope definitions.
pub mod period;
/// Collaborator traits for querying and directory loading.
pub mod provider;
/// Schema reconciliation of upstream rows.
pub mod reconcile;
/// Core data types (directory entries, requests, statement lines, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::ProbeCache;
pub use error::{FetchError, FinstateError, QueryError, Result};
pub use period::{Consolidation, ReportPeriod};
pub use provider::{DirectorySource, StatementQuery};
pub use reconcile::{Reconcile, reconcile};
pub use types::{
    CorporateDirectoryEntry, FetchRequest, FetchResult, RawRow, StatementLine, StatementType,
};
