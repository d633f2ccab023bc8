//! The two source datasets and their fixed column projections.
//!
//! Each dataset's schema is known up front. The header row delivered at
//! runtime is only validated against it and used to locate columns by
//! position; it never decides which columns exist.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  progress::ProgressRange,
  title::UNKNOWN,
};

/// Base location of the public dataset dumps.
pub const DATASETS_BASE_URL: &str = "https://datasets.imdbws.com";

/// The join key shared by both datasets.
pub const KEY_COLUMN: &str = "tconst";

pub const PRIMARY_TITLE: &str = "primaryTitle";
pub const ORIGINAL_TITLE: &str = "originalTitle";
pub const TITLE_TYPE: &str = "titleType";
pub const NUM_VOTES: &str = "numVotes";

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Storage type of a kept column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
  Text,
  Real,
  Integer,
}

impl SqlType {
  pub fn as_sql(self) -> &'static str {
    match self {
      Self::Text => "TEXT",
      Self::Real => "REAL",
      Self::Integer => "INTEGER",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
  Key,
  Keep(SqlType),
  Drop,
}

/// One column of a source dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
  pub name: &'static str,
  pub role: ColumnRole,
}

impl Column {
  const fn key(name: &'static str) -> Self { Self { name, role: ColumnRole::Key } }

  const fn keep(name: &'static str, ty: SqlType) -> Self {
    Self { name, role: ColumnRole::Keep(ty) }
  }

  const fn dropped(name: &'static str) -> Self { Self { name, role: ColumnRole::Drop } }
}

const RATINGS_COLUMNS: &[Column] = &[
  Column::key(KEY_COLUMN),
  Column::keep("averageRating", SqlType::Real),
  Column::keep(NUM_VOTES, SqlType::Integer),
];

const BASICS_COLUMNS: &[Column] = &[
  Column::key(KEY_COLUMN),
  Column::keep(TITLE_TYPE, SqlType::Text),
  Column::keep(PRIMARY_TITLE, SqlType::Text),
  Column::keep(ORIGINAL_TITLE, SqlType::Text),
  Column::dropped("isAdult"),
  Column::keep("startYear", SqlType::Text),
  Column::dropped("endYear"),
  Column::keep("runtimeMinutes", SqlType::Text),
  Column::keep("genres", SqlType::Text),
];

// ─── Dataset ─────────────────────────────────────────────────────────────────

/// A remote source file. Ingested in declaration order: ratings first, since
/// the basics stage is filtered by the ids the ratings stage admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
  Ratings,
  Basics,
}

impl Dataset {
  pub const ALL: [Dataset; 2] = [Self::Ratings, Self::Basics];

  /// Deterministic cache file name, identical to the remote file name.
  pub fn file_name(self) -> &'static str {
    match self {
      Self::Ratings => "title.ratings.tsv.gz",
      Self::Basics => "title.basics.tsv.gz",
    }
  }

  pub fn default_url(self) -> String {
    format!("{DATASETS_BASE_URL}/{}", self.file_name())
  }

  pub fn columns(self) -> &'static [Column] {
    match self {
      Self::Ratings => RATINGS_COLUMNS,
      Self::Basics => BASICS_COLUMNS,
    }
  }

  /// The slice of the overall 0–100 progress scale this dataset owns.
  pub fn progress_range(self) -> ProgressRange {
    match self {
      Self::Ratings => ProgressRange::new(0, 25),
      Self::Basics => ProgressRange::new(25, 100),
    }
  }
}

impl fmt::Display for Dataset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Ratings => "ratings",
      Self::Basics => "basics",
    })
  }
}

// ─── Projection ──────────────────────────────────────────────────────────────

/// A kept column located in the runtime header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectedColumn {
  pub name:     &'static str,
  pub sql_type: SqlType,
  /// Position of the field in each data row.
  pub index:    usize,
}

/// A single converted field ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
  Null,
  Text(&'a str),
  Real(f64),
  Integer(i64),
}

/// A data row that cannot be projected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDefect {
  /// Field count differs from the header's.
  Width { expected: usize, found: usize },
  /// A numeric column did not parse.
  Number { column: &'static str },
}

/// The positional mapping from a validated header to the kept columns.
#[derive(Debug, Clone)]
pub struct Projection {
  dataset:   Dataset,
  width:     usize,
  key_index: usize,
  columns:   Vec<ProjectedColumn>,
  ignored:   Vec<String>,
}

impl Projection {
  /// Validate `header` against the fixed schema of `dataset`.
  ///
  /// Columns are located by name, so a reordered header is accepted. Header
  /// fields unknown to the schema are ignored and reported by
  /// [`Projection::ignored`].
  pub fn negotiate(dataset: Dataset, header: &[&str]) -> Result<Self> {
    let position = |name: &str| header.iter().position(|h| *h == name);

    let mut key_index = None;
    let mut columns = Vec::new();
    for column in dataset.columns() {
      match column.role {
        ColumnRole::Key => key_index = position(column.name),
        ColumnRole::Keep(sql_type) => {
          let index = position(column.name).ok_or_else(|| Error::Schema {
            dataset,
            reason: format!("missing column {:?}", column.name),
          })?;
          columns.push(ProjectedColumn { name: column.name, sql_type, index });
        }
        ColumnRole::Drop => {}
      }
    }

    let key_index = key_index.ok_or_else(|| Error::Schema {
      dataset,
      reason: format!("missing key column {KEY_COLUMN:?}"),
    })?;

    let ignored = header
      .iter()
      .filter(|h| !dataset.columns().iter().any(|c| c.name == **h))
      .map(|h| (*h).to_owned())
      .collect();

    Ok(Self { dataset, width: header.len(), key_index, columns, ignored })
  }

  pub fn dataset(&self) -> Dataset { self.dataset }

  /// Number of fields every data row must carry.
  pub fn width(&self) -> usize { self.width }

  /// Kept columns in schema order.
  pub fn columns(&self) -> &[ProjectedColumn] { &self.columns }

  /// Header fields that are not part of the schema.
  pub fn ignored(&self) -> &[String] { &self.ignored }

  pub fn key<'a>(&self, fields: &[&'a str]) -> &'a str { fields[self.key_index] }

  /// The raw field for a kept column, by name.
  pub fn field<'a>(&self, fields: &[&'a str], name: &str) -> Option<&'a str> {
    self
      .columns
      .iter()
      .find(|c| c.name == name)
      .and_then(|c| fields.get(c.index).copied())
  }

  /// Check a data row's width before any field is read.
  pub fn check_width(&self, fields: &[&str]) -> Result<(), RowDefect> {
    if fields.len() == self.width {
      Ok(())
    } else {
      Err(RowDefect::Width { expected: self.width, found: fields.len() })
    }
  }

  /// Convert the kept fields of a row, in [`Projection::columns`] order.
  ///
  /// `originalTitle` becomes [`FieldValue::Null`] when it repeats
  /// `primaryTitle`. Numeric columns holding the unknown sentinel are null.
  pub fn values<'a>(&self, fields: &[&'a str]) -> Result<Vec<FieldValue<'a>>, RowDefect> {
    self.check_width(fields)?;
    let primary = self.field(fields, PRIMARY_TITLE);

    self
      .columns
      .iter()
      .map(|column| {
        let raw = fields[column.index];
        match column.sql_type {
          SqlType::Text if column.name == ORIGINAL_TITLE && Some(raw) == primary => {
            Ok(FieldValue::Null)
          }
          SqlType::Text => Ok(FieldValue::Text(raw)),
          _ if raw == UNKNOWN => Ok(FieldValue::Null),
          SqlType::Real => raw
            .parse()
            .map(FieldValue::Real)
            .map_err(|_| RowDefect::Number { column: column.name }),
          SqlType::Integer => raw
            .parse()
            .map(FieldValue::Integer)
            .map_err(|_| RowDefect::Number { column: column.name }),
        }
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const BASICS_HEADER: &[&str] = &[
    "tconst",
    "titleType",
    "primaryTitle",
    "originalTitle",
    "isAdult",
    "startYear",
    "endYear",
    "runtimeMinutes",
    "genres",
  ];

  #[test]
  fn ratings_projection_keeps_two_columns() {
    let p = Projection::negotiate(
      Dataset::Ratings,
      &["tconst", "averageRating", "numVotes"],
    )
    .unwrap();
    let names: Vec<_> = p.columns().iter().map(|c| c.name).collect();
    assert_eq!(names, ["averageRating", "numVotes"]);
    assert_eq!(p.columns()[0].sql_type, SqlType::Real);
    assert_eq!(p.columns()[1].sql_type, SqlType::Integer);
    assert_eq!(p.width(), 3);
  }

  #[test]
  fn basics_projection_drops_adult_and_end_year() {
    let p = Projection::negotiate(Dataset::Basics, BASICS_HEADER).unwrap();
    let names: Vec<_> = p.columns().iter().map(|c| c.name).collect();
    assert_eq!(
      names,
      [
        "titleType",
        "primaryTitle",
        "originalTitle",
        "startYear",
        "runtimeMinutes",
        "genres"
      ]
    );
    assert!(p.columns().iter().all(|c| c.sql_type == SqlType::Text));
    assert!(p.ignored().is_empty());
  }

  #[test]
  fn reordered_header_is_located_by_name() {
    let p = Projection::negotiate(
      Dataset::Ratings,
      &["numVotes", "tconst", "averageRating", "extra"],
    )
    .unwrap();
    let fields = ["1500", "tt0000001", "7.5", "x"];
    assert_eq!(p.key(&fields), "tt0000001");
    assert_eq!(p.field(&fields, NUM_VOTES), Some("1500"));
    assert_eq!(p.ignored(), ["extra"]);
    assert_eq!(
      p.values(&fields).unwrap(),
      vec![FieldValue::Real(7.5), FieldValue::Integer(1500)]
    );
  }

  #[test]
  fn missing_column_is_a_schema_error() {
    let err = Projection::negotiate(Dataset::Ratings, &["tconst", "numVotes"])
      .unwrap_err();
    assert!(matches!(err, Error::Schema { dataset: Dataset::Ratings, .. }));

    let err = Projection::negotiate(
      Dataset::Ratings,
      &["id", "averageRating", "numVotes"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("tconst"));
  }

  #[test]
  fn original_title_suppressed_when_equal() {
    let p = Projection::negotiate(Dataset::Basics, BASICS_HEADER).unwrap();
    let same = [
      "tt1", "movie", "Heat", "Heat", "0", "1995", "\\N", "170", "Crime",
    ];
    let values = p.values(&same).unwrap();
    assert_eq!(values[2], FieldValue::Null);

    let differ = [
      "tt2", "movie", "The Boy and the Heron", "Kimitachi wa dô ikiru ka", "0",
      "2023", "\\N", "124", "Animation",
    ];
    let values = p.values(&differ).unwrap();
    assert_eq!(values[2], FieldValue::Text("Kimitachi wa dô ikiru ka"));
    assert_eq!(values[3], FieldValue::Text("2023"));

    // Unknown sentinel stays text in text columns.
    let unknown_runtime = [
      "tt3", "tvSpecial", "Gala", "Gala", "0", "\\N", "\\N", "\\N", "\\N",
    ];
    let values = p.values(&unknown_runtime).unwrap();
    assert_eq!(values[3], FieldValue::Text("\\N"));
    assert_eq!(values[4], FieldValue::Text("\\N"));
    assert_eq!(values[5], FieldValue::Text("\\N"));
  }

  #[test]
  fn row_defects() {
    let p = Projection::negotiate(
      Dataset::Ratings,
      &["tconst", "averageRating", "numVotes"],
    )
    .unwrap();
    assert_eq!(
      p.values(&["tt1", "7.0"]),
      Err(RowDefect::Width { expected: 3, found: 2 })
    );
    assert_eq!(
      p.values(&["tt1", "7.0", "many"]),
      Err(RowDefect::Number { column: "numVotes" })
    );
    assert_eq!(
      p.values(&["tt1", "\\N", "12"]).unwrap()[0],
      FieldValue::Null
    );
  }

  #[test]
  fn cache_names_and_urls() {
    assert_eq!(Dataset::Ratings.file_name(), "title.ratings.tsv.gz");
    assert_eq!(
      Dataset::Basics.default_url(),
      "https://datasets.imdbws.com/title.basics.tsv.gz"
    );
  }
}
