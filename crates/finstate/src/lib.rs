#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finstate/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Financial-statement lookups by company name.
//!
//! # Features
//!
//! - `dart` - OpenDART statement client and corp-code directory loader
//! - `cache-sqlite` - SQLite-based probe caching
//!
//! # Example
//!
//! ```rust,ignore
//! use finstate::{DartClient, Lookup, StatementService};
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> finstate::Result<()> {
//!     let client = DartClient::new(std::env::var("DART_API_KEY").unwrap_or_default())?;
//!     let directory = client.fetch_directory().await?;
//!
//!     let service = StatementService::new(Arc::new(client));
//!     if let Lookup::Found { result, .. } = service.lookup(&directory, "삼성전자", 2023).await? {
//!         println!("{}", result.to_frame()?);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use finstate_core::*;

// Cache implementations
#[cfg(feature = "cache-sqlite")]
pub use finstate_cache::SqliteCache;
pub use finstate_cache::{InMemoryCache, NoopCache};

// Statement service
#[cfg(feature = "dart")]
pub use finstate_dart::{CorpCodeFile, DartClient};

mod cached;
mod fetcher;
mod resolver;
mod service;

pub use cached::CachedQuery;
pub use fetcher::{DEFAULT_MIN_ROWS, FetchPolicy, ProbeOutcome, fetch, probe};
pub use resolver::{resolve, resolve_entry};
pub use service::{Lookup, StatementService};
