//! # dltins-etl
//!
//! Downloads the ESMA FIRDS file listing, picks the latest delta (`DLTINS`)
//! archive, streams its terminated-instrument records into a flat CSV and
//! copies the CSV to a destination URI.
//!
//! ## Design Philosophy
//!
//! - **Bounded memory** - the record document is never loaded whole; one
//!   `TermntdRcrd` is in flight at a time
//! - **Absent is not failure** - no link, no archive entry or no rows end a
//!   run with a warning outcome instead of an error
//! - **Injectable edges** - fetching, uploading and event reporting are
//!   traits, so runs can be exercised without a network
//!
//! ## Quick Start
//!
//! ```no_run
//! use dltins_etl::{Config, Pipeline, RunOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         destination_uri: Some("file:///tmp/bucket/output.csv".to_string()),
//!         ..Default::default()
//!     };
//!
//!     let pipeline = Pipeline::new(config)?;
//!     match pipeline.run().await? {
//!         RunOutcome::Completed(report) => println!("{} rows written", report.rows),
//!         other => println!("nothing to do: {:?}", other),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Archive extraction
pub mod extraction;
/// Download collaborator
pub mod fetch;
/// Listing document and link resolution
pub mod listing;
/// Event observers
pub mod observer;
/// End-to-end pipeline
pub mod pipeline;
/// Upload collaborator
pub mod storage;
/// Streaming record transform and CSV output
pub mod transform;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, HttpConfig};
pub use error::{ArchiveError, Error, NetworkError, ParseError, Result, UploadError};
pub use fetch::{Fetcher, HttpFetcher};
pub use listing::{ListingDocument, ListingEntry, resolve_link};
pub use observer::{
    ChannelObserver, FanOut, NoopObserver, Observer, RecordingObserver, TracingObserver,
};
pub use pipeline::Pipeline;
pub use storage::{Uploader, UriUploader};
pub use transform::{InstrumentRecord, RecordCursor, TabularDataset, TabularExtractor, TabularRow};
pub use types::{EntrySelection, Event, LinkResolution, RunOutcome, RunReport, Stage};
