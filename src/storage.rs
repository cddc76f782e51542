//! Upload collaborator: copies the CSV output to its destination
//!
//! Destinations are URIs. `file://` copies locally, `http://` and `https://`
//! send the file as the body of a PUT request. Anything else is rejected
//! before any data moves.

use crate::config::HttpConfig;
use crate::error::{Error, Result, UploadError};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Copies a local file to a destination identified by URI
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Copy `local_path` to `destination_uri`
    ///
    /// # Errors
    ///
    /// [`Error::Upload`] when the URI is invalid, its scheme is unsupported,
    /// or the transfer fails.
    async fn upload(&self, local_path: &Path, destination_uri: &str) -> Result<()>;
}

/// [`Uploader`] dispatching on the URI scheme
#[derive(Clone, Debug)]
pub struct UriUploader {
    client: reqwest::Client,
}

impl UriUploader {
    /// Build an uploader whose HTTP backend uses the configured timeout
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Other(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn copy_to_file(&self, local_path: &Path, uri: &str, target: &Url) -> Result<()> {
        let destination = target.to_file_path().map_err(|()| UploadError::InvalidUri {
            uri: uri.to_string(),
            reason: "file URI does not name a local path".to_string(),
        })?;

        let transfer = |e: std::io::Error| UploadError::Transfer {
            uri: uri.to_string(),
            cause: Box::new(e),
        };

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(transfer)?;
        }
        // The URI never holds a partial file: copy alongside, then rename
        let partial = partial_path(&destination);
        let copied = match tokio::fs::copy(local_path, &partial).await {
            Ok(bytes) => tokio::fs::rename(&partial, &destination)
                .await
                .map(|()| bytes),
            Err(e) => Err(e),
        };
        match copied {
            Ok(bytes) => {
                debug!(?destination, bytes, "copied output");
                Ok(())
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(transfer(e).into())
            }
        }
    }

    async fn put_http(&self, local_path: &Path, uri: &str, target: Url) -> Result<()> {
        let body = tokio::fs::read(local_path).await?;
        let response = self
            .client
            .put(target)
            .header(reqwest::header::CONTENT_TYPE, "text/csv")
            .body(body)
            .send()
            .await
            .map_err(|e| UploadError::Transfer {
                uri: uri.to_string(),
                cause: Box::new(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Rejected {
                uri: uri.to_string(),
                status: status.as_u16(),
            }
            .into());
        }
        Ok(())
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".partial");
    PathBuf::from(name)
}

#[async_trait]
impl Uploader for UriUploader {
    async fn upload(&self, local_path: &Path, destination_uri: &str) -> Result<()> {
        let target = Url::parse(destination_uri).map_err(|e| UploadError::InvalidUri {
            uri: destination_uri.to_string(),
            reason: e.to_string(),
        })?;

        match target.scheme() {
            "file" => self.copy_to_file(local_path, destination_uri, &target).await?,
            "http" | "https" => self.put_http(local_path, destination_uri, target).await?,
            other => {
                return Err(UploadError::UnsupportedScheme {
                    uri: destination_uri.to_string(),
                    scheme: other.to_string(),
                }
                .into());
            }
        }

        info!(destination = destination_uri, "upload complete");
        Ok(())
    }
}
