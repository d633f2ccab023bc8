//! Retrieving a remote dataset file.

use std::{future::Future, path::Path, time::Duration};

use reqwest::Client;
use tokio::{fs::File, io::AsyncWriteExt as _};

use crate::{Error, Result};

/// Downloads a URL's body into a local file.
///
/// `dest` is a scratch path owned by the caller; on error the caller removes
/// whatever was written there.
pub trait Fetch: Send + Sync {
  fn download(&self, url: &str, dest: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// [`Fetch`] over HTTP(S), streaming the body to disk chunk by chunk.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpFetcher {
  client: Client,
}

impl HttpFetcher {
  /// `connect_timeout` bounds connection setup; `read_timeout` bounds each
  /// wait for more body bytes. There is no deadline on the whole transfer.
  pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .connect_timeout(connect_timeout)
      .read_timeout(read_timeout)
      .build()
      .map_err(|source| Error::Http { url: String::new(), source })?;
    Ok(Self { client })
  }
}

impl Fetch for HttpFetcher {
  async fn download(&self, url: &str, dest: &Path) -> Result<()> {
    let http = |source: reqwest::Error| Error::Http { url: url.to_owned(), source };

    let mut resp = self.client.get(url).send().await.map_err(http)?;
    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Status { url: url.to_owned(), status });
    }

    let mut file = File::create(dest).await?;
    let mut bytes = 0u64;
    while let Some(chunk) = resp.chunk().await.map_err(http)? {
      file.write_all(&chunk).await?;
      bytes += chunk.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;

    tracing::debug!(url, bytes, "download complete");
    Ok(())
  }
}
