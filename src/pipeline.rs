//! End-to-end pipeline: listing → link → archive → document → CSV → upload
//!
//! Each step runs strictly after the previous one. An absent intermediate
//! result (no link, no archive entry, no rows) ends the run early with a
//! warning-level [`RunOutcome`]; any error aborts the run and is returned
//! unchanged.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extraction;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::listing;
use crate::observer::{Observer, TracingObserver};
use crate::storage::{Uploader, UriUploader};
use crate::transform::{TabularDataset, TabularExtractor};
use crate::types::{Event, RunOutcome, RunReport, Stage};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pipeline executor
pub struct Pipeline {
    /// Run settings
    config: Arc<Config>,
    /// Downloads the listing and the archive
    fetcher: Arc<dyn Fetcher>,
    /// Copies the CSV to its destination
    uploader: Arc<dyn Uploader>,
    /// Receives progress and warning events
    observer: Arc<dyn Observer>,
}

impl Pipeline {
    /// Create a pipeline with the HTTP fetcher, URI uploader and tracing observer
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config.http)?);
        let uploader = Arc::new(UriUploader::new(&config.http)?);
        Ok(Self::with_components(
            config,
            fetcher,
            uploader,
            Arc::new(TracingObserver),
        ))
    }

    /// Create a pipeline with explicit collaborators
    pub fn with_components(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        uploader: Arc<dyn Uploader>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
            uploader,
            observer,
        }
    }

    /// Replace the observer
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Settings this pipeline runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute one full run
    ///
    /// # Returns
    ///
    /// * `Ok(RunOutcome::Completed(report))` - CSV written and uploaded
    /// * `Ok(RunOutcome::NoLinkFound { .. })` and the other warning outcomes -
    ///   a step found nothing to work on; no output was produced
    /// * `Err(_)` - a step failed
    pub async fn run(&self) -> Result<RunOutcome> {
        let started_at = Utc::now();
        self.config.validate()?;
        let destination_uri = self.config.resolved_destination_uri()?;
        tokio::fs::create_dir_all(&self.config.work_dir).await?;

        info!(
            classification = %self.config.classification,
            work_dir = ?self.config.work_dir,
            "starting pipeline run"
        );

        let Some(link) = self
            .resolve_link()
            .await
            .map_err(|e| self.failed(Stage::Listing, e))?
        else {
            return Ok(RunOutcome::NoLinkFound {
                classification: self.config.classification.clone(),
            });
        };

        let archive_path = self.config.archive_path();
        self.fetch(Stage::Archive, &link, &archive_path)
            .await
            .map_err(|e| self.failed(Stage::Archive, e))?;

        let Some(document_path) = self
            .extract_document(&archive_path)
            .await
            .map_err(|e| self.failed(Stage::Archive, e))?
        else {
            return Ok(RunOutcome::NoMatchingEntry {
                archive: archive_path,
            });
        };

        let dataset = self
            .transform(&document_path)
            .await
            .map_err(|e| self.failed(Stage::Transform, e))?;
        if dataset.is_empty() {
            return Ok(RunOutcome::NoRecords {
                document: document_path,
            });
        }

        let output_path = self.config.output_path();
        let rows = dataset.len();
        let serialize_path = output_path.clone();
        blocking(move || TabularExtractor::serialize(&dataset, &serialize_path))
            .await
            .map_err(|e| self.failed(Stage::Transform, e))?;
        self.observer.notify(&Event::OutputWritten {
            path: output_path.clone(),
            rows,
        });

        if let Err(e) = self.uploader.upload(&output_path, &destination_uri).await {
            // A run that fails leaves no output behind
            remove_logged(&output_path).await;
            return Err(self.failed(Stage::Upload, e));
        }
        self.observer.notify(&Event::Uploaded {
            destination: destination_uri.clone(),
        });

        let report = RunReport {
            rows,
            output_path,
            destination_uri,
            started_at,
            finished_at: Utc::now(),
        };
        info!(rows, destination = %report.destination_uri, "pipeline run complete");
        Ok(RunOutcome::Completed(report))
    }

    /// Report a failed step and hand the error back
    fn failed(&self, stage: Stage, error: Error) -> Error {
        self.observer.notify(&Event::Failed {
            stage,
            error: error.to_string(),
        });
        error
    }

    async fn fetch(&self, stage: Stage, url: &str, path: &Path) -> Result<()> {
        self.fetcher.fetch(url, path).await?;
        self.observer.notify(&Event::Fetched {
            stage,
            url: url.to_string(),
            path: path.to_path_buf(),
        });
        Ok(())
    }

    async fn resolve_link(&self) -> Result<Option<String>> {
        let listing_path = self.config.listing_path();
        self.fetch(Stage::Listing, &self.config.listing_url, &listing_path)
            .await?;

        let classification = self.config.classification.clone();
        let path = listing_path.clone();
        let resolution = blocking(move || listing::resolve_link(&path, &classification)).await?;
        self.discard(&listing_path).await;

        if resolution.match_count > 1 {
            self.observer.notify(&Event::DuplicateMatches {
                stage: Stage::Listing,
                count: resolution.match_count,
            });
        }
        match &resolution.link {
            Some(link) => self.observer.notify(&Event::LinkResolved {
                link: link.clone(),
                match_count: resolution.match_count,
            }),
            None => self.observer.notify(&Event::LinkNotFound {
                classification: self.config.classification.clone(),
            }),
        }
        Ok(resolution.link)
    }

    async fn extract_document(&self, archive_path: &Path) -> Result<Option<PathBuf>> {
        let archive = archive_path.to_path_buf();
        let target_dir = self.config.work_dir.clone();
        let suffix = self.config.document_suffix.clone();
        let selection =
            blocking(move || extraction::extract_document(&archive, &target_dir, &suffix)).await?;
        self.discard(archive_path).await;

        if selection.match_count > 1 {
            self.observer.notify(&Event::DuplicateMatches {
                stage: Stage::Archive,
                count: selection.match_count,
            });
        }
        match &selection.extracted {
            Some(path) => self.observer.notify(&Event::EntryExtracted {
                path: path.clone(),
                match_count: selection.match_count,
            }),
            None => self.observer.notify(&Event::NoMatchingEntry {
                archive: archive_path.to_path_buf(),
                suffix: self.config.document_suffix.clone(),
            }),
        }
        Ok(selection.extracted)
    }

    async fn transform(&self, document_path: &Path) -> Result<TabularDataset> {
        let document = document_path.to_path_buf();
        let observer = Arc::clone(&self.observer);
        blocking(move || TabularExtractor::transform(&document, observer.as_ref())).await
    }

    /// Remove an intermediate file unless the config asks to keep it
    async fn discard(&self, path: &Path) {
        if !self.config.keep_intermediate {
            remove_logged(path).await;
        }
    }
}

async fn remove_logged(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(?path, "removed file"),
        Err(e) => warn!(?path, error = %e, "failed to remove file"),
    }
}

/// Run a synchronous step on the blocking pool
async fn blocking<T, F>(step: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(step)
        .await
        .map_err(|e| Error::Other(format!("pipeline step panicked: {}", e)))?
}
