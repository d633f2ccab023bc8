//! `offmdb`: offline IMDb title catalog.
//!
//! Reads `offmdb.toml` (or the path given with `--config`), layered under
//! `OFFMDB_*` environment variables, and runs one command.
//!
//! # Usage
//!
//! ```
//! offmdb refresh
//! offmdb search "heron" --limit 10
//! offmdb status
//! ```

mod render;
mod settings;

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use offmdb_core::catalog::{SearchQuery, TitleCatalog as _};
use offmdb_refresh::{HttpFetcher, MetadataFile, Refresher, SourceCache};
use offmdb_store_sqlite::SqliteStore;
use settings::AppConfig;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "offmdb", version, about = "Offline IMDb title catalog")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "offmdb.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Download the datasets and rebuild the title table.
  Refresh,
  /// Find titles whose primary or original title contains TEXT.
  Search {
    text: String,
    /// Maximum number of results.
    #[arg(short, long)]
    limit: Option<usize>,
    /// Match case exactly instead of ignoring ASCII case.
    #[arg(long)]
    case_sensitive: bool,
    /// Print results as JSON.
    #[arg(long)]
    json: bool,
  },
  /// Show when the catalog was last refreshed.
  Status,
  /// Delete downloaded dataset files.
  ClearCache,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&cli.config)?;

  match cli.command {
    Command::Refresh => refresh(cfg).await,
    Command::Search { text, limit, case_sensitive, json } => {
      let query = SearchQuery { text, limit, case_sensitive };
      search(cfg, query, json).await?;
      Ok(ExitCode::SUCCESS)
    }
    Command::Status => {
      status(cfg).await?;
      Ok(ExitCode::SUCCESS)
    }
    Command::ClearCache => {
      let fetcher = HttpFetcher::new(cfg.refresh.connect_timeout(), cfg.refresh.read_timeout())?;
      let cache = SourceCache::new(fetcher, &cfg.refresh);
      cache.clear().await.context("failed to clear source cache")?;
      tracing::info!(dir = %cache.dir().display(), "source cache cleared");
      Ok(ExitCode::SUCCESS)
    }
  }
}

async fn open_store(cfg: &AppConfig) -> anyhow::Result<SqliteStore> {
  SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))
}

// ─── Commands ────────────────────────────────────────────────────────────────

async fn refresh(cfg: AppConfig) -> anyhow::Result<ExitCode> {
  let store = open_store(&cfg).await?;
  let fetcher = HttpFetcher::new(cfg.refresh.connect_timeout(), cfg.refresh.read_timeout())?;
  let refresher = Refresher::new(
    store,
    fetcher,
    MetadataFile::new(&cfg.metadata_path),
    cfg.refresh,
  );

  // Ctrl-C cancels the run; cleanup still happens.
  let cancel = CancellationToken::new();
  tokio::spawn({
    let cancel = cancel.clone();
    async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("interrupt received, cancelling refresh");
        cancel.cancel();
      }
    }
  });

  let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
  let reporter = tokio::spawn(async move {
    while let Some(percent) = rx.recv().await {
      tracing::info!(percent, "refresh progress");
    }
  });
  let progress = Arc::new(move |percent: u8| {
    let _ = tx.send(percent);
  });

  let result = refresher.run(progress, cancel).await;
  // The sink, and with it the sender, is gone once `run` returns.
  let _ = reporter.await;

  match result {
    Ok(outcome) => {
      println!("{}", render::status_line(Some(&outcome.metadata())));
      Ok(ExitCode::SUCCESS)
    }
    Err(e) if e.is_cancelled() => {
      eprintln!("refresh cancelled");
      Ok(ExitCode::from(130))
    }
    Err(e) => Err(e).context("refresh failed"),
  }
}

async fn search(cfg: AppConfig, query: SearchQuery, json: bool) -> anyhow::Result<()> {
  let store = open_store(&cfg).await?;
  if !store.has_titles().await? {
    tracing::warn!("catalog is empty; run `offmdb refresh` first");
  }
  let titles = store.search(&query).await.context("search failed")?;

  if json {
    println!("{}", serde_json::to_string_pretty(&titles)?);
  } else {
    for title in &titles {
      println!("{}", render::title_line(title));
    }
  }
  Ok(())
}

async fn status(cfg: AppConfig) -> anyhow::Result<()> {
  let metadata = MetadataFile::new(&cfg.metadata_path)
    .load()
    .await
    .context("failed to read refresh metadata")?;
  println!("{}", render::status_line(metadata.as_ref()));
  Ok(())
}
