//! Refresh metadata: what the last successful refresh produced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed textual format of the persisted timestamp (UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Written only after a successful swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshMetadata {
  #[serde(with = "timestamp")]
  pub last_refresh: DateTime<Utc>,
  pub item_count:   u64,
}

impl RefreshMetadata {
  pub fn formatted_last_refresh(&self) -> String {
    self.last_refresh.format(TIMESTAMP_FORMAT).to_string()
  }
}

mod timestamp {
  use chrono::{DateTime, NaiveDateTime, Utc};
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  use super::TIMESTAMP_FORMAT;

  pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&dt.format(TIMESTAMP_FORMAT))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(d)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
      .map(|naive| naive.and_utc())
      .map_err(D::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamp_uses_fixed_format() {
    let meta = RefreshMetadata {
      last_refresh: Utc.with_ymd_and_hms(2026, 10, 17, 8, 5, 0).unwrap(),
      item_count:   312_004,
    };
    let json = serde_json::to_string(&meta).unwrap();
    assert_eq!(
      json,
      r#"{"last_refresh":"2026-10-17 08:05:00","item_count":312004}"#
    );
    let back: RefreshMetadata = serde_json::from_str(&json).unwrap();
    assert_eq!(back, meta);
    assert_eq!(meta.formatted_last_refresh(), "2026-10-17 08:05:00");
  }

  #[test]
  fn rejects_other_formats() {
    let err = serde_json::from_str::<RefreshMetadata>(
      r#"{"last_refresh":"2026-10-17T08:05:00Z","item_count":1}"#,
    );
    assert!(err.is_err());
  }
}
