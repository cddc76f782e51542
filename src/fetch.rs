//! Fetch collaborator: downloads a URL to a local file

use crate::config::HttpConfig;
use crate::error::{Error, NetworkError, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Downloads remote resources to local storage
///
/// Implementations own their timeout policy; the pipeline neither retries
/// nor wraps their errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` into `destination`, replacing any existing file
    ///
    /// # Errors
    ///
    /// [`Error::Network`] for transport or HTTP status failures and
    /// [`Error::Io`] when the destination cannot be written.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<()>;
}

/// [`Fetcher`] backed by `reqwest`, streaming the body to disk
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the configured timeout and user agent
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Other(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| NetworkError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let mut file = tokio::fs::File::create(destination).await?;
        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|source| NetworkError::Request {
                url: url.to_string(),
                source,
            })?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<()> {
        debug!(url, ?destination, "starting download");

        if let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        match self.download(url, destination).await {
            Ok(bytes) => {
                info!(url, ?destination, bytes, "download complete");
                Ok(())
            }
            Err(e) => {
                warn!(url, error = %e, "download failed");
                // A partial body must not be mistaken for a complete one
                let _ = tokio::fs::remove_file(destination).await;
                Err(e)
            }
        }
    }
}
