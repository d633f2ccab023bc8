//! Refresh settings, deserialised from the `[refresh]` config table.

use std::{path::PathBuf, time::Duration};

use offmdb_core::{
  dataset::Dataset,
  stage::{DEFAULT_MIN_VOTES, Stage},
  title::TitleType,
};
use serde::Deserialize;

/// Rough row counts of the published files; only used to scale progress.
pub const RATINGS_EXPECTED_ROWS: u64 = 1_600_000;
pub const BASICS_EXPECTED_ROWS: u64 = 11_500_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
  pub ratings_url:           String,
  pub basics_url:            String,
  pub cache_dir:             PathBuf,
  /// Titles need strictly more votes than this.
  pub min_votes:             u32,
  pub ratings_expected_rows: u64,
  pub basics_expected_rows:  u64,
  /// Basics rows of other types are dropped.
  pub title_types:           Vec<TitleType>,
  /// Bound on establishing a connection.
  pub connect_timeout_secs:  u64,
  /// Bound on a stall while reading a response body.
  pub read_timeout_secs:     u64,
}

impl Default for RefreshConfig {
  fn default() -> Self {
    Self {
      ratings_url:           Dataset::Ratings.default_url(),
      basics_url:            Dataset::Basics.default_url(),
      cache_dir:             std::env::temp_dir().join("offmdb-cache"),
      min_votes:             DEFAULT_MIN_VOTES,
      ratings_expected_rows: RATINGS_EXPECTED_ROWS,
      basics_expected_rows:  BASICS_EXPECTED_ROWS,
      title_types:           TitleType::ALL.to_vec(),
      connect_timeout_secs:  30,
      read_timeout_secs:     120,
    }
  }
}

impl RefreshConfig {
  pub fn url(&self, dataset: Dataset) -> &str {
    match dataset {
      Dataset::Ratings => &self.ratings_url,
      Dataset::Basics => &self.basics_url,
    }
  }

  pub fn connect_timeout(&self) -> Duration { Duration::from_secs(self.connect_timeout_secs) }

  pub fn read_timeout(&self) -> Duration { Duration::from_secs(self.read_timeout_secs) }

  pub fn ratings_stage(&self) -> Stage {
    Stage::Ratings {
      min_votes:     self.min_votes,
      expected_rows: self.ratings_expected_rows,
    }
  }
}
