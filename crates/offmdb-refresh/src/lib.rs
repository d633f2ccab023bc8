//! Refresh pipeline for the offline title catalog.
//!
//! Downloads the two datasets into a scratch cache, streams them through the
//! store's ingest stages, swaps the result into production and records
//! [`RefreshMetadata`](offmdb_core::metadata::RefreshMetadata) on success.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod metadata;
pub mod pipeline;
pub mod source;

pub use cache::SourceCache;
pub use config::RefreshConfig;
pub use error::{Error, Result};
pub use fetch::{Fetch, HttpFetcher};
pub use metadata::MetadataFile;
pub use pipeline::{RefreshOutcome, Refresher};
pub use source::LineSource;
