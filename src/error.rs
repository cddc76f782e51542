//! Error types for dltins-etl
//!
//! The taxonomy mirrors the pipeline stages:
//! - [`ParseError`] for malformed listing/record documents (and CSV read-back)
//! - [`ArchiveError`] for unreadable or empty archives
//! - [`NetworkError`] and [`Error::Io`] for the fetch collaborator
//! - [`UploadError`] for the storage collaborator
//!
//! "Not found" outcomes (no link, no archive entry, no rows) are never errors;
//! they surface as [`RunOutcome`](crate::types::RunOutcome) variants instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dltins-etl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed underlying cause, kept for diagnostics
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for dltins-etl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "listing_url")
        key: Option<String>,
    },

    /// Malformed or unexpected document structure
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Unreadable or empty archive
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Fetch collaborator failed at the HTTP level
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Upload collaborator failed
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Other error (background task failures and the like)
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a configuration error for a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Document parsing errors
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not well-formed
    #[error("malformed document {source_name} at byte {position}: {cause}")]
    Malformed {
        /// File name or label of the document being read
        source_name: String,
        /// Byte offset reported by the reader
        position: u64,
        /// Underlying reader error
        #[source]
        cause: Cause,
    },

    /// Input ended while elements were still open
    #[error("document {source_name} ended before all open elements were closed")]
    Truncated {
        /// File name or label of the document being read
        source_name: String,
    },

    /// CSV read back with a header other than the fixed column set
    #[error("unexpected CSV header in {path}: {found}")]
    UnexpectedHeader {
        /// The CSV file
        path: PathBuf,
        /// The header that was found, comma-joined
        found: String,
    },

    /// A CSV cell could not be interpreted
    #[error("invalid value {value:?} for column {column} on line {line}")]
    InvalidValue {
        /// Column name
        column: String,
        /// Offending cell text
        value: String,
        /// 1-based line number
        line: u64,
    },
}

impl ParseError {
    /// Wrap a reader error together with the document label and position
    pub fn malformed(source_name: &str, position: u64, cause: impl Into<Cause>) -> Self {
        ParseError::Malformed {
            source_name: source_name.to_string(),
            position,
            cause: cause.into(),
        }
    }
}

/// Archive errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive could not be opened or an entry could not be read
    #[error("unreadable archive {archive}: {cause}")]
    Unreadable {
        /// The archive file
        archive: PathBuf,
        /// Underlying zip error
        #[source]
        cause: zip::result::ZipError,
    },

    /// The archive contains no entries at all
    #[error("archive {archive} is empty")]
    Empty {
        /// The archive file
        archive: PathBuf,
    },

    /// The selected entry would be written outside the target directory
    #[error("archive {archive} entry {entry:?} has an unsafe path")]
    UnsafeEntryPath {
        /// The archive file
        archive: PathBuf,
        /// The raw entry name
        entry: String,
    },
}

/// Fetch collaborator errors
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The request could not be sent or the body could not be read
    #[error("request to {url} failed: {source}")]
    Request {
        /// Requested URL
        url: String,
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },
}

/// Upload collaborator errors
#[derive(Debug, Error)]
pub enum UploadError {
    /// The destination is not a valid URI
    #[error("invalid destination URI {uri}: {reason}")]
    InvalidUri {
        /// Destination URI as given
        uri: String,
        /// Why it was rejected
        reason: String,
    },

    /// No backend handles this URI scheme
    #[error("unsupported destination scheme {scheme:?} in {uri}")]
    UnsupportedScheme {
        /// Destination URI as given
        uri: String,
        /// The URI scheme
        scheme: String,
    },

    /// Copying or sending the file failed
    #[error("transfer to {uri} failed: {cause}")]
    Transfer {
        /// Destination URI
        uri: String,
        /// Underlying I/O or HTTP error
        #[source]
        cause: Cause,
    },

    /// The remote store refused the upload
    #[error("{uri} rejected the upload with HTTP {status}")]
    Rejected {
        /// Destination URI
        uri: String,
        /// HTTP status code
        status: u16,
    },
}
