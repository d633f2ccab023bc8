//! Local cache of downloaded dataset files.

use std::{
  io,
  path::{Path, PathBuf},
};

use offmdb_core::dataset::Dataset;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{Error, Fetch, RefreshConfig, Result};

const PART_SUFFIX: &str = ".part";

/// Holds at most one file per dataset, named after the dataset's file name.
///
/// A file is only ever present in full: downloads land in a uniquely named
/// `.part` file that is renamed into place on success and removed otherwise.
pub struct SourceCache<F> {
  fetcher: F,
  config:  RefreshConfig,
}

impl<F: Fetch> SourceCache<F> {
  pub fn new(fetcher: F, config: &RefreshConfig) -> Self {
    Self { fetcher, config: config.clone() }
  }

  pub fn dir(&self) -> &Path { &self.config.cache_dir }

  /// Where `dataset` is cached, whether or not it is present.
  pub fn path(&self, dataset: Dataset) -> PathBuf { self.dir().join(dataset.file_name()) }

  /// Return the cached file for `dataset`, downloading it first if absent.
  pub async fn ensure(&self, dataset: Dataset, cancel: &CancellationToken) -> Result<PathBuf> {
    let path = self.path(dataset);
    if tokio::fs::try_exists(&path).await? {
      tracing::debug!(%dataset, path = %path.display(), "source cache hit");
      return Ok(path);
    }

    tokio::fs::create_dir_all(self.dir()).await?;
    let part = self.dir().join(format!(
      ".{}.{}{PART_SUFFIX}",
      dataset.file_name(),
      Uuid::new_v4()
    ));
    let url = self.config.url(dataset);
    tracing::info!(%dataset, url, "downloading source");

    let fetched = tokio::select! {
      biased;
      () = cancel.cancelled() => Err(Error::Cancelled),
      r = self.fetcher.download(url, &part) => r,
    };
    let placed = match fetched {
      Ok(()) => tokio::fs::rename(&part, &path).await.map_err(Error::from),
      Err(e) => Err(e),
    };
    if let Err(e) = placed {
      remove_quietly(&part).await;
      return Err(e);
    }
    Ok(path)
  }

  /// Remove every cached dataset file and any interrupted download.
  pub async fn clear(&self) -> Result<()> {
    for dataset in Dataset::ALL {
      remove_file(&self.path(dataset)).await?;
    }

    let mut entries = match tokio::fs::read_dir(self.dir()).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
      Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
      let name = entry.file_name();
      let name = name.to_string_lossy();
      if name.starts_with('.') && name.ends_with(PART_SUFFIX) {
        remove_file(&entry.path()).await?;
      }
    }
    Ok(())
  }
}

/// Delete `path`; a missing file is not an error.
async fn remove_file(path: &Path) -> Result<()> {
  match tokio::fs::remove_file(path).await {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e.into()),
  }
}

async fn remove_quietly(path: &Path) {
  if let Err(e) = remove_file(path).await {
    tracing::warn!(path = %path.display(), error = %e, "failed to remove partial download");
  }
}
