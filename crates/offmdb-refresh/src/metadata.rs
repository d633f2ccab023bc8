//! Persisting [`RefreshMetadata`] next to the store.

use std::path::{Path, PathBuf};

use offmdb_core::metadata::RefreshMetadata;
use uuid::Uuid;

use crate::Result;

/// A JSON file holding the metadata of the last successful refresh.
#[derive(Debug, Clone)]
pub struct MetadataFile {
  path: PathBuf,
}

impl MetadataFile {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  /// `None` until the first refresh succeeds.
  pub async fn load(&self) -> Result<Option<RefreshMetadata>> {
    match tokio::fs::read(&self.path).await {
      Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  /// Replace the file atomically: write a sibling temp file, then rename.
  pub async fn save(&self, metadata: &RefreshMetadata) -> Result<()> {
    let json = serde_json::to_vec_pretty(metadata)?;
    let file_name = self
      .path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| "metadata".to_owned());
    let tmp = self
      .path
      .with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&tmp, &json).await?;
    if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
      remove_quietly(&tmp).await;
      return Err(e.into());
    }
    Ok(())
  }
}

async fn remove_quietly(path: &Path) {
  if let Err(e) = tokio::fs::remove_file(path).await {
    tracing::warn!(path = %path.display(), error = %e, "failed to remove metadata temp file");
  }
}
