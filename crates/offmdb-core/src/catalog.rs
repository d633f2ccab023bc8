//! The `TitleCatalog` trait and its query type.
//!
//! The trait is implemented by storage backends (e.g. `offmdb-store-sqlite`).
//! The command-line host searches through this abstraction; only the refresh
//! pipeline talks to a concrete backend.

use std::future::Future;

use crate::title::TitleRecord;

/// Result cap applied when a query does not set one.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`TitleCatalog::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
  /// Fragment that must occur in the primary or original title.
  pub text:           String,
  /// Maximum number of results; [`DEFAULT_SEARCH_LIMIT`] when `None`.
  pub limit:          Option<usize>,
  /// Match case exactly instead of ASCII case-insensitively.
  pub case_sensitive: bool,
}

impl SearchQuery {
  pub fn new(text: impl Into<String>) -> Self {
    Self { text: text.into(), ..Self::default() }
  }

  pub fn limit(&self) -> usize { self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Read-only access to the production title table.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait TitleCatalog: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Titles containing `query.text`, most-voted first, at most
  /// `query.limit()` of them. Empty when no refresh has completed yet.
  fn search<'a>(
    &'a self,
    query: &'a SearchQuery,
  ) -> impl Future<Output = Result<Vec<TitleRecord>, Self::Error>> + Send + 'a;

  /// Whether a production table exists.
  fn has_titles(&self) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Number of rows in the production table; zero when it does not exist.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
