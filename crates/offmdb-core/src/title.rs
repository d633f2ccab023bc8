//! Title records, the rows served by the catalog.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Sentinel the source datasets use for an unknown value.
pub const UNKNOWN: &str = "\\N";

// ─── Title type ──────────────────────────────────────────────────────────────

/// The closed set of title categories delivered by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TitleType {
  Short,
  Movie,
  TvShort,
  TvSeries,
  TvMovie,
  TvEpisode,
  TvMiniSeries,
  TvSpecial,
  Video,
  VideoGame,
}

impl TitleType {
  pub const ALL: [TitleType; 10] = [
    Self::Short,
    Self::Movie,
    Self::TvShort,
    Self::TvSeries,
    Self::TvMovie,
    Self::TvEpisode,
    Self::TvMiniSeries,
    Self::TvSpecial,
    Self::Video,
    Self::VideoGame,
  ];

  /// The identifier used in the source data and in the `titleType` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Short => "short",
      Self::Movie => "movie",
      Self::TvShort => "tvShort",
      Self::TvSeries => "tvSeries",
      Self::TvMovie => "tvMovie",
      Self::TvEpisode => "tvEpisode",
      Self::TvMiniSeries => "tvMiniSeries",
      Self::TvSpecial => "tvSpecial",
      Self::Video => "video",
      Self::VideoGame => "videoGame",
    }
  }

  /// Human-facing label: `tvMiniSeries` → `TV MiniSeries`, `movie` → `Movie`.
  pub fn label(self) -> String {
    let raw = self.as_str();
    if let Some(rest) = raw.strip_prefix("tv") {
      return format!("TV {rest}");
    }
    let mut chars = raw.chars();
    match chars.next() {
      Some(first) => first.to_uppercase().chain(chars).collect(),
      None => String::new(),
    }
  }
}

impl fmt::Display for TitleType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for TitleType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|t| t.as_str() == s)
      .ok_or_else(|| Error::UnknownTitleType(s.to_owned()))
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One row of the production table.
///
/// Year, runtime and genres are kept exactly as delivered, including the
/// [`UNKNOWN`] sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleRecord {
  pub id:              String,
  pub title_type:      TitleType,
  pub primary_title:   String,
  /// Only present when it differs from `primary_title`.
  pub original_title:  Option<String>,
  pub start_year:      String,
  pub runtime_minutes: String,
  pub genres:          String,
  pub average_rating:  f64,
  pub num_votes:       u32,
}

impl TitleRecord {
  /// The original title, falling back to the primary one.
  pub fn original_title(&self) -> &str {
    self.original_title.as_deref().unwrap_or(&self.primary_title)
  }

  /// Runtime as `"{h}h{m}m"`; unknown or malformed values pass through.
  pub fn formatted_runtime(&self) -> String {
    match self.runtime_minutes.parse::<u32>() {
      Ok(total) => format!("{}h{}m", total / 60, total % 60),
      Err(_) => self.runtime_minutes.clone(),
    }
  }

  /// Vote count abbreviated to `M`/`k` with at most two decimals.
  pub fn formatted_votes(&self) -> String {
    let votes = f64::from(self.num_votes);
    if votes > 1e6 {
      format!("{}M", two_decimals(votes / 1e6))
    } else if votes > 1000.0 {
      format!("{}k", two_decimals(votes / 1000.0))
    } else {
      self.num_votes.to_string()
    }
  }
}

fn two_decimals(value: f64) -> String {
  let s = format!("{value:.2}");
  s.trim_end_matches('0').trim_end_matches('.').to_owned()
}

/// `None` for the source's unknown-value sentinel.
pub fn known(value: &str) -> Option<&str> {
  (value != UNKNOWN).then_some(value)
}
