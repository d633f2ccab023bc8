//! Error type for `offmdb-refresh`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[from] offmdb_store_sqlite::Error),

  #[error("fetching {url}: {source}")]
  Http {
    url:    String,
    #[source]
    source: reqwest::Error,
  },

  #[error("fetching {url}: server answered {status}")]
  Status {
    url:    String,
    status: reqwest::StatusCode,
  },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("metadata error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("refresh cancelled")]
  Cancelled,

  #[error("a refresh is already running")]
  Busy,

  /// The new table is live but its metadata could not be written.
  #[error("table swapped ({item_count} titles) but metadata not recorded: {source}")]
  Unrecorded {
    item_count: u64,
    #[source]
    source:     Box<Error>,
  },
}

impl Error {
  /// True for cancellation, whether observed here or inside an ingest stage.
  pub fn is_cancelled(&self) -> bool {
    match self {
      Self::Cancelled => true,
      Self::Store(e) => e.is_cancelled(),
      _ => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
