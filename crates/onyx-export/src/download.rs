//! Fetching pre-built artifacts over HTTP.
//!
//! Models that are not produced by the exporter (the `alreadyPresent`
//! catalog entries) can name a `url`; a missing artifact is downloaded
//! from there into the models directory.

use crate::error::{PipelineError, PublishFailure};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("onyx-model-downloader/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Download `url` into `dest` and return the number of bytes written.
    ///
    /// `dest` is only replaced once the whole body has arrived.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, PublishFailure>;
}

/// `reqwest`-backed fetcher. Follows redirects.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| PipelineError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let name = dest.file_name().map_or_else(|| "artifact".into(), |n| n.to_string_lossy().into_owned());
    dest.with_file_name(format!("{name}.part"))
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, PublishFailure> {
        let download_err = |message: String| PublishFailure::Download { url: url.to_string(), message };

        debug!(url, dest = %dest.display(), "Downloading artifact");
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| download_err(e.to_string()))?;

        let partial = partial_path(dest);
        let mut file = tokio::fs::File::create(&partial).await.map_err(|e| download_err(e.to_string()))?;
        let mut written = 0u64;
        let streamed = async {
            while let Some(chunk) = response.chunk().await.map_err(|e| e.to_string())? {
                file.write_all(&chunk).await.map_err(|e| e.to_string())?;
                written += chunk.len() as u64;
            }
            file.flush().await.map_err(|e| e.to_string())
        }
        .await;
        drop(file);

        if let Err(message) = streamed {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(download_err(message));
        }
        tokio::fs::rename(&partial, dest).await.map_err(|e| download_err(e.to_string()))?;

        info!(url, bytes = written, "Downloaded artifact");
        Ok(written)
    }
}
