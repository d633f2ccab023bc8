//! The ingest loop shared by both stages.
//!
//! Runs synchronously on the connection thread. Everything a stage writes,
//! including the columns its header adds, happens inside one transaction that
//! is committed only after the last line; any early return drops the
//! transaction and rolls the staging table back.

use std::io;

use offmdb_core::{
  dataset::{Dataset, Projection},
  progress::{ProgressMeter, ProgressSink},
  stage::{AdmissionSet, Stage, StageReport, Verdict},
  tsv::Records,
};
use rusqlite::{Connection, ErrorCode, Transaction, types::Value};
use tokio_util::sync::CancellationToken;

use crate::{
  Error, Result,
  encode::encode_field,
  schema::{PRUNE_UNMATCHED, STAGING},
};

pub fn run_stage<I>(
  conn: &mut Connection,
  stage: &Stage,
  lines: I,
  sink: &dyn ProgressSink,
  cancel: &CancellationToken,
) -> Result<StageReport>
where
  I: Iterator<Item = io::Result<String>>,
{
  let dataset = stage.dataset();
  let mut meter = ProgressMeter::new(sink, dataset.progress_range(), stage.expected_rows());
  meter.begin();

  let tx = conn.transaction()?;
  let mut records = Records::new(lines);

  let header = match records.next() {
    Some(record) => record.map_err(Error::Read)?,
    None => {
      return Err(Error::Core(offmdb_core::Error::Schema {
        dataset,
        reason: "no header row".into(),
      }));
    }
  };
  let projection = Projection::negotiate(dataset, &header.fields())?;
  if !projection.ignored().is_empty() {
    tracing::debug!(%dataset, ignored = ?projection.ignored(), "ignoring unknown columns");
  }
  add_columns(&tx, &projection)?;

  let mut report = StageReport::new(dataset);
  let mut admission = matches!(stage, Stage::Ratings { .. }).then(AdmissionSet::new);

  {
    let mut stmt = tx.prepare(&write_sql(&projection))?;

    for record in records {
      if cancel.is_cancelled() {
        return Err(Error::Cancelled);
      }
      let record = record.map_err(Error::Read)?;
      let fields = record.fields();
      report.rows += 1;
      meter.advance(report.rows);

      if projection.check_width(&fields).is_err() {
        report.skipped += 1;
        continue;
      }
      match stage.admit(&projection, &fields) {
        Verdict::Admit => {}
        Verdict::Reject => continue,
        Verdict::Skip => {
          report.skipped += 1;
          continue;
        }
      }
      let Ok(values) = projection.values(&fields) else {
        report.skipped += 1;
        continue;
      };

      let key = projection.key(&fields);
      let params = bind(dataset, key, values.iter().map(encode_field));
      match stmt.execute(rusqlite::params_from_iter(params)) {
        Ok(0) => continue,
        Ok(_) => {}
        Err(e) if is_constraint_violation(&e) => {
          report.skipped += 1;
          continue;
        }
        Err(e) => return Err(e.into()),
      }

      report.admitted += 1;
      if let Some(ids) = admission.as_mut() {
        ids.insert(key);
      }
    }
  }

  if dataset == Dataset::Basics {
    report.pruned = tx.execute(PRUNE_UNMATCHED, [])? as u64;
  }
  tx.commit()?;
  meter.finish();

  if report.skipped > 0 {
    tracing::warn!(%dataset, skipped = report.skipped, "skipped malformed rows");
  }
  tracing::info!(
    %dataset,
    rows = report.rows,
    admitted = report.admitted,
    pruned = report.pruned,
    "stage committed"
  );

  report.admission = admission;
  Ok(report)
}

/// Add one staging column per kept header field.
fn add_columns(tx: &Transaction<'_>, projection: &Projection) -> Result<()> {
  for column in projection.columns() {
    tx.execute(
      &format!(
        "ALTER TABLE {STAGING} ADD COLUMN \"{}\" {}",
        column.name,
        column.sql_type.as_sql()
      ),
      [],
    )?;
  }
  Ok(())
}

/// Ratings insert a new keyed row; basics update the row ratings created.
fn write_sql(projection: &Projection) -> String {
  let names: Vec<String> = projection
    .columns()
    .iter()
    .map(|c| format!("\"{}\"", c.name))
    .collect();

  match projection.dataset() {
    Dataset::Ratings => {
      let placeholders: Vec<String> =
        (1..=names.len() + 1).map(|i| format!("?{i}")).collect();
      format!(
        "INSERT INTO {STAGING} (tconst, {}) VALUES ({})",
        names.join(", "),
        placeholders.join(", ")
      )
    }
    Dataset::Basics => {
      let assignments: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{name} = ?{}", i + 1))
        .collect();
      format!(
        "UPDATE {STAGING} SET {} WHERE tconst = ?{}",
        assignments.join(", "),
        names.len() + 1
      )
    }
  }
}

/// Order parameters to match [`write_sql`].
fn bind(dataset: Dataset, key: &str, values: impl Iterator<Item = Value>) -> Vec<Value> {
  let key = Value::Text(key.to_owned());
  match dataset {
    Dataset::Ratings => std::iter::once(key).chain(values).collect(),
    Dataset::Basics => values.chain(std::iter::once(key)).collect(),
  }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation
  )
}
