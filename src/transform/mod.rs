//! Streaming transform of the record document into a flat table
//!
//! [`RecordCursor`] walks the document one `TermntdRcrd` at a time,
//! [`TabularDataset`] accumulates the flattened rows, and
//! [`TabularExtractor::serialize`] writes them as CSV.

mod cursor;
mod dataset;
mod record;

pub use cursor::{RECORD_NAMESPACE, RECORD_TAG, RecordCursor};
pub use dataset::{
    A_COUNT_COLUMN, CONTAINS_A_COLUMN, HEADER, TabularDataset, TabularRow, count_a,
};
pub use record::{Field, InstrumentRecord};

use crate::error::Result;
use crate::observer::Observer;
use crate::types::Event;
use std::io::BufRead;
use std::path::Path;
use tracing::debug;

/// Record document to CSV transform
pub struct TabularExtractor;

impl TabularExtractor {
    /// Stream the document at `document_path` into a dataset
    ///
    /// A document without any terminated record is not an error: the empty
    /// dataset is returned and [`Event::NoRecords`] is reported, leaving the
    /// caller to decide whether to continue.
    pub fn transform(document_path: &Path, observer: &dyn Observer) -> Result<TabularDataset> {
        debug!(?document_path, "streaming record document");
        let dataset = TabularDataset::from_records(RecordCursor::open(document_path)?)?;
        Self::report(document_path, &dataset, observer);
        Ok(dataset)
    }

    /// Same as [`TabularExtractor::transform`] for an already-open reader
    pub fn transform_reader<R: BufRead>(
        input: R,
        source_name: &str,
        observer: &dyn Observer,
    ) -> Result<TabularDataset> {
        let dataset = TabularDataset::from_records(RecordCursor::new(input, source_name))?;
        Self::report(Path::new(source_name), &dataset, observer);
        Ok(dataset)
    }

    /// Write `dataset` as CSV to `output_path`
    pub fn serialize(dataset: &TabularDataset, output_path: &Path) -> Result<()> {
        dataset.write_csv(output_path)
    }

    fn report(document: &Path, dataset: &TabularDataset, observer: &dyn Observer) {
        let event = if dataset.is_empty() {
            Event::NoRecords {
                document: document.to_path_buf(),
            }
        } else {
            Event::RecordsExtracted {
                document: document.to_path_buf(),
                rows: dataset.len(),
            }
        };
        observer.notify(&event);
    }
}
