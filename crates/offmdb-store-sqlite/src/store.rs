//! [`SqliteStore`], the SQLite implementation of [`TitleCatalog`], plus the
//! staging operations the refresh pipeline drives.

use std::{io, path::Path, sync::Arc};

use offmdb_core::{
  catalog::{SearchQuery, TitleCatalog},
  progress::ProgressSink,
  stage::{Stage, StageReport},
  title::TitleRecord,
};
use rusqlite::OptionalExtension as _;
use tokio_util::sync::CancellationToken;

use crate::{
  Result,
  encode::{RawTitle, like_pattern},
  ingest,
  schema::{
    COUNT_TITLES, DROP_STAGING, PRAGMAS, PRODUCTION, PROMOTE_STAGING, READER_PRAGMAS,
    RESET_STAGING, STAGING, TABLE_EXISTS, search_exact, search_like,
  },
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A title store backed by a single SQLite file.
///
/// Staging work and the swap go through a writer connection; the
/// [`TitleCatalog`] methods use a separate reader connection. In WAL mode the
/// reader keeps seeing the committed production table while a stage is being
/// ingested, and sees the new one as soon as the swap commits. Cloning is
/// cheap; both connections are reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  writer: tokio_rusqlite::Connection,
  reader: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let writer = tokio_rusqlite::Connection::open(&path).await?;
    init(&writer, PRAGMAS).await?;
    let reader = tokio_rusqlite::Connection::open(&path).await?;
    init(&reader, READER_PRAGMAS).await?;
    Ok(Self { writer, reader })
  }

  /// Open an in-memory store, for tests.
  ///
  /// An in-memory database lives in one connection, so reads and writes
  /// share it and a search waits for a running stage.
  pub async fn open_in_memory() -> Result<Self> {
    let writer = tokio_rusqlite::Connection::open_in_memory().await?;
    init(&writer, PRAGMAS).await?;
    Ok(Self { reader: writer.clone(), writer })
  }

  // ── Staging ───────────────────────────────────────────────────────────────

  /// Replace any staging table with an empty one holding only the key.
  pub async fn reset_staging(&self) -> Result<()> {
    self
      .writer
      .call(|conn| {
        conn.execute_batch(RESET_STAGING)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Drop the staging table, if any. Production is untouched.
  pub async fn discard_staging(&self) -> Result<()> {
    self
      .writer
      .call(|conn| {
        conn.execute_batch(DROP_STAGING)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run one ingest stage over `lines` into the staging table.
  ///
  /// The first line must be the dataset header. Progress is reported within
  /// the dataset's range; `cancel` is checked before every row. On error the
  /// stage's writes are rolled back.
  pub async fn ingest<I>(
    &self,
    stage: Stage,
    lines: I,
    progress: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
  ) -> Result<StageReport>
  where
    I: Iterator<Item = io::Result<String>> + Send + 'static,
  {
    let dataset = stage.dataset();
    tracing::info!(%dataset, "ingest started");

    let report = self
      .writer
      .call(move |conn| Ok(ingest::run_stage(conn, &stage, lines, &*progress, &cancel)))
      .await??;
    Ok(report)
  }

  /// Atomically replace the production table with the staging table.
  /// Returns the number of rows now served.
  pub async fn promote_staging(&self) -> Result<u64> {
    let count = self
      .writer
      .call(|conn| {
        let tx = conn.transaction()?;
        tx.execute_batch(PROMOTE_STAGING)?;
        let count: i64 = tx.query_row(COUNT_TITLES, [], |r| r.get(0))?;
        tx.commit()?;
        Ok(count)
      })
      .await?;

    tracing::info!(count, "staging promoted to production");
    Ok(count.max(0) as u64)
  }

  /// Whether a staging table is present, e.g. left over from a failed run.
  pub async fn has_staging(&self) -> Result<bool> {
    table_exists(&self.writer, STAGING).await
  }
}

async fn init(conn: &tokio_rusqlite::Connection, pragmas: &'static str) -> Result<()> {
  conn
    .call(move |conn| {
      conn.execute_batch(pragmas)?;
      Ok(())
    })
    .await?;
  Ok(())
}

/// Whether a table called `name` exists.
async fn table_exists(conn: &tokio_rusqlite::Connection, name: &'static str) -> Result<bool> {
  let exists = conn
    .call(move |conn| {
      Ok(
        conn
          .query_row(TABLE_EXISTS, rusqlite::params![name], |_| Ok(true))
          .optional()?
          .unwrap_or(false),
      )
    })
    .await?;
  Ok(exists)
}

// ─── TitleCatalog impl ───────────────────────────────────────────────────────

impl TitleCatalog for SqliteStore {
  type Error = crate::Error;

  async fn search(&self, query: &SearchQuery) -> Result<Vec<TitleRecord>> {
    let (sql, needle) = if query.case_sensitive {
      (search_exact(), query.text.clone())
    } else {
      (search_like(), like_pattern(&query.text))
    };
    let limit = i64::try_from(query.limit()).unwrap_or(i64::MAX);

    let raws: Vec<RawTitle> = self
      .reader
      .call(move |conn| {
        let exists = conn
          .query_row(TABLE_EXISTS, rusqlite::params![PRODUCTION], |_| Ok(()))
          .optional()?
          .is_some();
        if !exists {
          return Ok(Vec::new());
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![needle, limit], RawTitle::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTitle::into_record).collect()
  }

  async fn has_titles(&self) -> Result<bool> { table_exists(&self.reader, PRODUCTION).await }

  async fn count(&self) -> Result<u64> {
    if !self.has_titles().await? {
      return Ok(0);
    }
    let count: i64 = self
      .reader
      .call(|conn| Ok(conn.query_row(COUNT_TITLES, [], |r| r.get(0))?))
      .await?;
    Ok(count.max(0) as u64)
  }
}
