//! Plain-text rendering of search results and refresh status.

use offmdb_core::{
  metadata::RefreshMetadata,
  title::{TitleRecord, known},
};

/// One result line: id, title, year, type, runtime, rating and votes.
pub fn title_line(t: &TitleRecord) -> String {
  let mut line = format!("{}  {}", t.id, t.primary_title);
  if let Some(original) = &t.original_title {
    line.push_str(&format!(" [{original}]"));
  }
  if let Some(year) = known(&t.start_year) {
    line.push_str(&format!(" ({year})"));
  }
  line.push_str(&format!("  {}", t.title_type.label()));
  if known(&t.runtime_minutes).is_some() {
    line.push_str(&format!("  {}", t.formatted_runtime()));
  }
  line.push_str(&format!(
    "  {:.1}/10  {} votes",
    t.average_rating,
    t.formatted_votes()
  ));
  line
}

pub fn status_line(metadata: Option<&RefreshMetadata>) -> String {
  match metadata {
    Some(m) => format!(
      "{} titles, last refreshed {} UTC",
      m.item_count,
      m.formatted_last_refresh()
    ),
    None => "never refreshed".to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use offmdb_core::title::TitleType;

  use super::*;

  #[test]
  fn full_line() {
    let t = TitleRecord {
      id:              "tt23289160".into(),
      title_type:      TitleType::Movie,
      primary_title:   "The Boy and the Heron".into(),
      original_title:  Some("Kimitachi wa dô ikiru ka".into()),
      start_year:      "2023".into(),
      runtime_minutes: "124".into(),
      genres:          "Animation".into(),
      average_rating:  7.5,
      num_votes:       1234,
    };
    assert_eq!(
      title_line(&t),
      "tt23289160  The Boy and the Heron [Kimitachi wa dô ikiru ka] (2023)  Movie  2h4m  7.5/10  1.23k votes"
    );
  }

  #[test]
  fn unknown_fields_are_omitted() {
    let t = TitleRecord {
      id:              "tt2".into(),
      title_type:      TitleType::TvMiniSeries,
      primary_title:   "Beyond the Veil".into(),
      original_title:  None,
      start_year:      "\\N".into(),
      runtime_minutes: "\\N".into(),
      genres:          "\\N".into(),
      average_rating:  6.0,
      num_votes:       300,
    };
    assert_eq!(
      title_line(&t),
      "tt2  Beyond the Veil  TV MiniSeries  6.0/10  300 votes"
    );
    assert_eq!(status_line(None), "never refreshed");
  }
}
