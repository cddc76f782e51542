//! Core types for dltins-etl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pipeline step, used to label events
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Listing download and link resolution
    Listing,
    /// Archive download and entry extraction
    Archive,
    /// Streaming record transform and CSV write
    Transform,
    /// Copy of the CSV to its destination
    Upload,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Listing => "listing",
            Stage::Archive => "archive",
            Stage::Transform => "transform",
            Stage::Upload => "upload",
        };
        f.write_str(name)
    }
}

/// Outcome of looking up a classification in the listing
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkResolution {
    /// Download link of the first matching entry, if any
    pub link: Option<String>,
    /// Number of entries carrying the requested classification
    pub match_count: usize,
}

/// Outcome of picking an entry out of an archive
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntrySelection {
    /// Path the first matching entry was written to, if any
    pub extracted: Option<PathBuf>,
    /// Number of entries whose name ends with the requested suffix
    pub match_count: usize,
}

/// Event emitted while a pipeline run progresses
///
/// Warning-level events (`LinkNotFound`, `NoMatchingEntry`, `NoRecords`,
/// `DuplicateMatches`) never abort a run on their own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A collaborator finished downloading a file
    Fetched {
        /// Stage the download belongs to
        stage: Stage,
        /// Source URL
        url: String,
        /// Local destination
        path: PathBuf,
    },

    /// The listing yielded a download link
    LinkResolved {
        /// The link that will be fetched
        link: String,
        /// Entries carrying the classification
        match_count: usize,
    },

    /// No listing entry carries the classification
    LinkNotFound {
        /// Classification that was looked up
        classification: String,
    },

    /// More than one candidate matched; only the first is used
    DuplicateMatches {
        /// Where the duplicates were seen
        stage: Stage,
        /// Number of matches
        count: usize,
    },

    /// An archive entry was written to disk
    EntryExtracted {
        /// Extracted file
        path: PathBuf,
        /// Entries matching the suffix
        match_count: usize,
    },

    /// The archive holds no entry with the expected suffix
    NoMatchingEntry {
        /// Archive that was searched
        archive: PathBuf,
        /// Suffix that was looked for
        suffix: String,
    },

    /// The record document was fully scanned
    RecordsExtracted {
        /// Source document
        document: PathBuf,
        /// Number of rows produced
        rows: usize,
    },

    /// The record document contained no terminated records
    NoRecords {
        /// Source document
        document: PathBuf,
    },

    /// The CSV output was written
    OutputWritten {
        /// CSV path
        path: PathBuf,
        /// Number of data rows
        rows: usize,
    },

    /// The CSV output was copied to its destination
    Uploaded {
        /// Destination URI
        destination: String,
    },

    /// A step failed and the run was aborted
    Failed {
        /// Step that failed
        stage: Stage,
        /// Error message
        error: String,
    },
}

impl Event {
    /// Whether this event reports a non-fatal warning condition
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::LinkNotFound { .. }
                | Event::DuplicateMatches { .. }
                | Event::NoMatchingEntry { .. }
                | Event::NoRecords { .. }
        )
    }
}

/// Summary of a run that produced output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// Number of data rows written
    pub rows: usize,
    /// Local CSV path
    pub output_path: PathBuf,
    /// Where the CSV was copied to
    pub destination_uri: String,
    /// Run start time
    pub started_at: DateTime<Utc>,
    /// Run end time
    pub finished_at: DateTime<Utc>,
}

/// How a pipeline run ended without raising
#[must_use]
#[derive(Clone, Debug)]
pub enum RunOutcome {
    /// Output written and uploaded
    Completed(RunReport),
    /// The listing has no usable entry for the classification
    NoLinkFound {
        /// Classification that was looked up
        classification: String,
    },
    /// The archive holds no entry with the expected suffix
    NoMatchingEntry {
        /// Archive that was searched
        archive: PathBuf,
    },
    /// The record document produced zero rows
    NoRecords {
        /// Source document
        document: PathBuf,
    },
}

impl RunOutcome {
    /// Whether the run produced an output artifact
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }
}
