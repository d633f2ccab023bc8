//! Layered configuration: optional TOML file under `OFFMDB_*` variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use offmdb_refresh::RefreshConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub store_path:    PathBuf,
  pub metadata_path: PathBuf,
  pub refresh:       RefreshConfig,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      store_path:    PathBuf::from("offmdb.db"),
      metadata_path: PathBuf::from("offmdb-meta.json"),
      refresh:       RefreshConfig::default(),
    }
  }
}

impl AppConfig {
  /// Read `file` (if it exists), then apply the environment on top.
  ///
  /// Nested keys use a double underscore, e.g. `OFFMDB_REFRESH__MIN_VOTES`.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(
        config::Environment::with_prefix("OFFMDB")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    let mut cfg: AppConfig = settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.metadata_path = expand_tilde(&cfg.metadata_path);
    cfg.refresh.cache_dir = expand_tilde(&cfg.refresh.cache_dir);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
