//! Ingest stage definitions: which rows each pass admits.

use std::{collections::HashSet, sync::Arc};

use crate::{
  dataset::{Dataset, NUM_VOTES, Projection, TITLE_TYPE},
  title::TitleType,
};

/// Default minimum vote count; ratings at or below it are not admitted.
pub const DEFAULT_MIN_VOTES: u32 = 150;

// ─── Admission set ───────────────────────────────────────────────────────────

/// Identifiers admitted by the ratings stage. Gates the basics stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionSet(HashSet<String>);

impl AdmissionSet {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, id: &str) -> bool { self.0.insert(id.to_owned()) }

  pub fn contains(&self, id: &str) -> bool { self.0.contains(id) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl FromIterator<String> for AdmissionSet {
  fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
    Self(iter.into_iter().collect())
  }
}

// ─── Stage ───────────────────────────────────────────────────────────────────

/// What to do with one data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
  Admit,
  /// Well-formed, filtered out.
  Reject,
  /// Malformed; counted as skipped.
  Skip,
}

/// One pass over one dataset.
#[derive(Debug, Clone)]
pub enum Stage {
  /// Inserts rows with more than `min_votes` votes and collects their ids.
  Ratings { min_votes: u32, expected_rows: u64 },
  /// Updates rows whose id the ratings stage admitted.
  Basics {
    admitted:      Arc<AdmissionSet>,
    title_types:   Vec<TitleType>,
    expected_rows: u64,
  },
}

impl Stage {
  pub fn dataset(&self) -> Dataset {
    match self {
      Self::Ratings { .. } => Dataset::Ratings,
      Self::Basics { .. } => Dataset::Basics,
    }
  }

  /// Row count at which the stage's progress range is exhausted.
  pub fn expected_rows(&self) -> u64 {
    match self {
      Self::Ratings { expected_rows, .. } | Self::Basics { expected_rows, .. } => {
        *expected_rows
      }
    }
  }

  /// Apply the stage's admission predicate to a width-checked row.
  pub fn admit(&self, projection: &Projection, fields: &[&str]) -> Verdict {
    match self {
      Self::Ratings { min_votes, .. } => {
        match projection.field(fields, NUM_VOTES).map(str::parse::<u32>) {
          Some(Ok(votes)) if votes > *min_votes => Verdict::Admit,
          Some(Ok(_)) => Verdict::Reject,
          _ => Verdict::Skip,
        }
      }
      Self::Basics { admitted, title_types, .. } => {
        if !admitted.contains(projection.key(fields)) {
          return Verdict::Reject;
        }
        match projection.field(fields, TITLE_TYPE).map(str::parse::<TitleType>) {
          Some(Ok(t)) if title_types.contains(&t) => Verdict::Admit,
          Some(Ok(_)) => Verdict::Reject,
          _ => Verdict::Skip,
        }
      }
    }
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Outcome of one committed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
  pub dataset:   Dataset,
  /// Data rows read, header excluded.
  pub rows:      u64,
  /// Rows that passed the admission filter and were written.
  pub admitted:  u64,
  /// Malformed rows, unknown title types and duplicate keys.
  pub skipped:   u64,
  /// Staging rows removed because no admitted basics row joined them.
  pub pruned:    u64,
  /// Ids written by the ratings stage; `None` for basics.
  pub admission: Option<AdmissionSet>,
}

impl StageReport {
  pub fn new(dataset: Dataset) -> Self {
    Self { dataset, rows: 0, admitted: 0, skipped: 0, pruned: 0, admission: None }
  }
}
