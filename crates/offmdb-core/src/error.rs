//! Error types for `offmdb-core`.

use thiserror::Error;

use crate::dataset::Dataset;

#[derive(Debug, Error)]
pub enum Error {
  /// The header row of a dataset does not carry the expected columns.
  #[error("{dataset} header rejected: {reason}")]
  Schema { dataset: Dataset, reason: String },

  #[error("unknown title type: {0:?}")]
  UnknownTitleType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
