//! The refresh orchestration: fetch, ingest, swap, record.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound as _, Utc};
use offmdb_core::{
  metadata::RefreshMetadata,
  progress::{Monotonic, ProgressSink},
  stage::{Stage, StageReport},
};
use offmdb_store_sqlite::SqliteStore;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{Error, Fetch, LineSource, MetadataFile, RefreshConfig, Result, SourceCache};

/// What a successful refresh produced.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
  pub ratings:      StageReport,
  pub basics:       StageReport,
  pub item_count:   u64,
  pub last_refresh: DateTime<Utc>,
}

impl RefreshOutcome {
  pub fn metadata(&self) -> RefreshMetadata {
    RefreshMetadata {
      last_refresh: self.last_refresh,
      item_count:   self.item_count,
    }
  }
}

// ─── Refresher ───────────────────────────────────────────────────────────────

/// Rebuilds the title table from the remote datasets.
///
/// Searches keep being served from the previous table until the swap. Any
/// failure before the swap leaves both the table and the metadata file as
/// they were. The download cache is emptied after every run.
pub struct Refresher<F> {
  store:    SqliteStore,
  cache:    SourceCache<F>,
  metadata: MetadataFile,
  config:   RefreshConfig,
  running:  Mutex<()>,
}

impl<F: Fetch> Refresher<F> {
  pub fn new(
    store: SqliteStore,
    fetcher: F,
    metadata: MetadataFile,
    config: RefreshConfig,
  ) -> Self {
    Self {
      cache: SourceCache::new(fetcher, &config),
      store,
      metadata,
      config,
      running: Mutex::new(()),
    }
  }

  pub fn metadata(&self) -> &MetadataFile { &self.metadata }

  /// Run one refresh. Fails with [`Error::Busy`] if one is already running.
  pub async fn run(
    &self,
    progress: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
  ) -> Result<RefreshOutcome> {
    let Ok(_running) = self.running.try_lock() else {
      return Err(Error::Busy);
    };
    tracing::info!("refresh started");

    let progress: Arc<dyn ProgressSink> = Arc::new(Monotonic::new(progress));
    let result = self.refresh(progress, &cancel).await;

    if let Err(e) = &result
      && !matches!(e, Error::Unrecorded { .. })
      && let Err(e) = self.store.discard_staging().await
    {
      tracing::warn!(error = %e, "failed to discard staging table");
    }
    if let Err(e) = self.cache.clear().await {
      tracing::warn!(error = %e, "failed to clear source cache");
    }

    match &result {
      Ok(outcome) => tracing::info!(
        item_count = outcome.item_count,
        ratings_skipped = outcome.ratings.skipped,
        basics_skipped = outcome.basics.skipped,
        "refresh finished"
      ),
      Err(e) if e.is_cancelled() => tracing::info!("refresh cancelled"),
      Err(Error::Unrecorded { item_count, source }) => tracing::error!(
        item_count = *item_count,
        error = %source,
        "table swapped, metadata not recorded"
      ),
      Err(e) => tracing::error!(error = %e, "refresh failed"),
    }
    result
  }

  async fn refresh(
    &self,
    progress: Arc<dyn ProgressSink>,
    cancel: &CancellationToken,
  ) -> Result<RefreshOutcome> {
    self.store.reset_staging().await?;

    let mut ratings = self
      .stage(self.config.ratings_stage(), &progress, cancel)
      .await?;
    let admitted = ratings.admission.take().unwrap_or_default();
    tracing::info!(admitted = admitted.len(), "ratings admitted");

    let basics = Stage::Basics {
      admitted:      Arc::new(admitted),
      title_types:   self.config.title_types.clone(),
      expected_rows: self.config.basics_expected_rows,
    };
    let basics = self.stage(basics, &progress, cancel).await?;

    if cancel.is_cancelled() {
      return Err(Error::Cancelled);
    }
    let item_count = self.store.promote_staging().await?;

    let outcome = RefreshOutcome {
      ratings,
      basics,
      item_count,
      last_refresh: Utc::now().trunc_subsecs(0),
    };
    if let Err(e) = self.metadata.save(&outcome.metadata()).await {
      return Err(Error::Unrecorded { item_count, source: Box::new(e) });
    }
    Ok(outcome)
  }

  async fn stage(
    &self,
    stage: Stage,
    progress: &Arc<dyn ProgressSink>,
    cancel: &CancellationToken,
  ) -> Result<StageReport> {
    if cancel.is_cancelled() {
      return Err(Error::Cancelled);
    }
    let path = self.cache.ensure(stage.dataset(), cancel).await?;
    let lines = LineSource::open(&path)?;
    let report = self
      .store
      .ingest(stage, lines, progress.clone(), cancel.clone())
      .await?;
    Ok(report)
  }
}
