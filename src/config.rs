//! Configuration types for dltins-etl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// FIRDS file index query returning an XML result listing.
pub const DEFAULT_LISTING_URL: &str = "https://registers.esma.europa.eu/solr/esma_registers_firds_files/select?q=*&fq=publication_date:%5B2021-01-17T00:00:00Z+TO+2021-01-19T23:59:59Z%5D&wt=xml&indent=true&start=0&rows=100";

/// HTTP client settings for the fetch and upload collaborators
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Main configuration for a pipeline run
///
/// Every field has a default, so an empty JSON object is a valid config file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// URL of the listing document enumerating downloadable files
    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    /// Classification tag of the file to download (default: "DLTINS")
    #[serde(default = "default_classification")]
    pub classification: String,

    /// Archive entry suffix identifying the record document (default: ".xml")
    #[serde(default = "default_document_suffix")]
    pub document_suffix: String,

    /// Working directory for intermediate and output files (default: "./data")
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// File name for the downloaded listing
    #[serde(default = "default_listing_file_name")]
    pub listing_file_name: String,

    /// File name for the downloaded archive
    #[serde(default = "default_archive_file_name")]
    pub archive_file_name: String,

    /// File name for the CSV written inside `work_dir`
    #[serde(default = "default_output_file_name")]
    pub output_file_name: String,

    /// Where the CSV is copied to (None = `file://<work_dir>/bucket/output.csv`)
    #[serde(default)]
    pub destination_uri: Option<String>,

    /// Keep the listing and archive after their contents have been used
    #[serde(default)]
    pub keep_intermediate: bool,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            classification: default_classification(),
            document_suffix: default_document_suffix(),
            work_dir: default_work_dir(),
            listing_file_name: default_listing_file_name(),
            archive_file_name: default_archive_file_name(),
            output_file_name: default_output_file_name(),
            destination_uri: None,
            keep_intermediate: false,
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load a JSON config file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })
    }

    /// Check the settings a run depends on before any I/O happens
    pub fn validate(&self) -> Result<()> {
        if self.classification.trim().is_empty() {
            return Err(Error::config("classification", "must not be empty"));
        }
        if self.document_suffix.is_empty() {
            return Err(Error::config("document_suffix", "must not be empty"));
        }
        url::Url::parse(&self.listing_url)
            .map_err(|e| Error::config("listing_url", format!("not a valid URL: {}", e)))?;
        if let Some(uri) = &self.destination_uri {
            url::Url::parse(uri)
                .map_err(|e| Error::config("destination_uri", format!("not a valid URI: {}", e)))?;
        }
        if self.http.timeout.is_zero() {
            return Err(Error::config("http.timeout", "must be greater than zero"));
        }
        for (key, name) in [
            ("listing_file_name", &self.listing_file_name),
            ("archive_file_name", &self.archive_file_name),
            ("output_file_name", &self.output_file_name),
        ] {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(Error::config(key, "must be a plain file name"));
            }
        }
        Ok(())
    }

    /// Local path of the downloaded listing
    pub fn listing_path(&self) -> PathBuf {
        self.work_dir.join(&self.listing_file_name)
    }

    /// Local path of the downloaded archive
    pub fn archive_path(&self) -> PathBuf {
        self.work_dir.join(&self.archive_file_name)
    }

    /// Local path of the CSV output
    pub fn output_path(&self) -> PathBuf {
        self.work_dir.join(&self.output_file_name)
    }

    /// Destination URI, falling back to a `file://` URI under the work directory
    pub fn resolved_destination_uri(&self) -> Result<String> {
        if let Some(uri) = &self.destination_uri {
            return Ok(uri.clone());
        }
        let bucket = std::path::absolute(&self.work_dir)?
            .join("bucket")
            .join("output.csv");
        url::Url::from_file_path(&bucket)
            .map(String::from)
            .map_err(|()| {
                Error::config(
                    "work_dir",
                    format!("cannot express {} as a file URI", bucket.display()),
                )
            })
    }
}

fn default_listing_url() -> String {
    DEFAULT_LISTING_URL.to_string()
}

fn default_classification() -> String {
    "DLTINS".to_string()
}

fn default_document_suffix() -> String {
    ".xml".to_string()
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_listing_file_name() -> String {
    "esma_data.xml".to_string()
}

fn default_archive_file_name() -> String {
    "dltins.zip".to_string()
}

fn default_output_file_name() -> String {
    "dltins.csv".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("dltins-etl/{}", env!("CARGO_PKG_VERSION"))
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
