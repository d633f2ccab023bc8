//! Conversions between domain types and SQLite values.

use offmdb_core::{
  dataset::FieldValue,
  title::{TitleRecord, TitleType, UNKNOWN},
};
use rusqlite::types::Value;

use crate::{Error, Result};

// ─── Writes ──────────────────────────────────────────────────────────────────

pub fn encode_field(value: &FieldValue<'_>) -> Value {
  match value {
    FieldValue::Null => Value::Null,
    FieldValue::Text(s) => Value::Text((*s).to_owned()),
    FieldValue::Real(r) => Value::Real(*r),
    FieldValue::Integer(i) => Value::Integer(*i),
  }
}

/// Escape `%`, `_` and `\` and wrap in wildcards for a substring `LIKE`.
pub fn like_pattern(fragment: &str) -> String {
  let mut pattern = String::with_capacity(fragment.len() + 2);
  pattern.push('%');
  for c in fragment.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// A production row as stored, before validation.
pub struct RawTitle {
  pub id:              String,
  pub title_type:      Option<String>,
  pub primary_title:   Option<String>,
  pub original_title:  Option<String>,
  pub start_year:      Option<String>,
  pub runtime_minutes: Option<String>,
  pub genres:          Option<String>,
  pub average_rating:  Option<f64>,
  pub num_votes:       Option<i64>,
}

impl RawTitle {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      title_type:      row.get(1)?,
      primary_title:   row.get(2)?,
      original_title:  row.get(3)?,
      start_year:      row.get(4)?,
      runtime_minutes: row.get(5)?,
      genres:          row.get(6)?,
      average_rating:  row.get(7)?,
      num_votes:       row.get(8)?,
    })
  }

  pub fn into_record(self) -> Result<TitleRecord> {
    let title_type: TitleType = self
      .title_type
      .as_deref()
      .unwrap_or_default()
      .parse()?;
    let num_votes = self.num_votes.unwrap_or_default();
    let num_votes = u32::try_from(num_votes).map_err(|_| Error::Decode {
      column: "numVotes",
      value:  num_votes.to_string(),
    })?;
    let or_unknown = |v: Option<String>| v.unwrap_or_else(|| UNKNOWN.to_owned());

    Ok(TitleRecord {
      id: self.id,
      title_type,
      primary_title: self.primary_title.unwrap_or_default(),
      original_title: self.original_title,
      start_year: or_unknown(self.start_year),
      runtime_minutes: or_unknown(self.runtime_minutes),
      genres: or_unknown(self.genres),
      average_rating: self.average_rating.unwrap_or_default(),
      num_votes,
    })
  }
}
