//! Error type for `offmdb-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] offmdb_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  /// The line source failed mid-dataset (I/O or decompression).
  #[error("reading source lines: {0}")]
  Read(#[source] std::io::Error),

  #[error("invalid stored value in column {column}: {value}")]
  Decode { column: &'static str, value: String },

  #[error("ingest cancelled")]
  Cancelled,
}

impl Error {
  pub fn is_cancelled(&self) -> bool { matches!(self, Self::Cancelled) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
