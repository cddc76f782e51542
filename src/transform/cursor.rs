//! Forward-only cursor over terminated records
//!
//! The record document can be a multi-gigabyte registry dump, so it is never
//! loaded as a tree. [`RecordCursor`] pulls events from a namespace-aware
//! streaming reader and yields one owned [`InstrumentRecord`] per
//! `TermntdRcrd` element. Per-record state lives only inside
//! [`RecordCursor::next`]; the event buffer is cleared after every event, so
//! peak memory is bounded by the largest single record.

use super::record::{Field, InstrumentRecord};
use crate::error::{ParseError, Result};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Namespace the record element must be bound to
pub const RECORD_NAMESPACE: &str = "urn:iso:std:iso:20022:tech:xsd:auth.036.001.02";

/// Local name of the repeating record element
pub const RECORD_TAG: &str = "TermntdRcrd";

/// What a top-level event means for the scan
enum Step {
    RecordStart,
    EmptyRecord,
    Eof,
    Truncated,
    Skip,
    Failed(quick_xml::Error),
}

/// Iterator of records from a streaming XML source
pub struct RecordCursor<R: BufRead> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    source_name: String,
    records_read: u64,
    /// Elements open outside the record being read
    depth: usize,
    finished: bool,
}

impl RecordCursor<BufReader<File>> {
    /// Open the document at `path`; the file is closed when the cursor drops
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}

impl<R: BufRead> RecordCursor<R> {
    /// Wrap a buffered reader; `source_name` labels parse errors
    pub fn new(input: R, source_name: impl Into<String>) -> Self {
        Self {
            reader: NsReader::from_reader(input),
            buf: Vec::new(),
            source_name: source_name.into(),
            records_read: 0,
            depth: 0,
            finished: false,
        }
    }

    /// Records yielded so far
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Capacity of the reusable event buffer, in bytes
    ///
    /// Stays at the size of the largest single event, independent of how
    /// many records have been read.
    pub fn scratch_capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Advance to the next record boundary
    fn next_step(&mut self) -> Step {
        self.buf.clear();
        match self.reader.read_resolved_event_into(&mut self.buf) {
            Ok((ns, Event::Start(e))) if is_record(&ns, e.local_name().as_ref()) => {
                Step::RecordStart
            }
            Ok((ns, Event::Empty(e))) if is_record(&ns, e.local_name().as_ref()) => {
                Step::EmptyRecord
            }
            Ok((_, Event::Start(_))) => {
                self.depth += 1;
                Step::Skip
            }
            Ok((_, Event::End(_))) => {
                self.depth = self.depth.saturating_sub(1);
                Step::Skip
            }
            // quick-xml reports end of input even with elements still open
            Ok((_, Event::Eof)) if self.depth > 0 => Step::Truncated,
            Ok((_, Event::Eof)) => Step::Eof,
            Ok(_) => Step::Skip,
            Err(e) => Step::Failed(e),
        }
    }

    /// Read the body of a record whose start tag was just consumed
    ///
    /// Each field takes the direct text of the first element found at its
    /// path; later elements at the same path are ignored.
    fn read_record(&mut self) -> Result<InstrumentRecord> {
        let mut record = InstrumentRecord::default();
        let mut path: Vec<String> = Vec::new();
        let mut claimed = [false; Field::ALL.len()];
        // (field, text so far, depth of the field element)
        let mut capture: Option<(Field, String, usize)> = None;

        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    return Err(ParseError::malformed(
                        &self.source_name,
                        self.reader.buffer_position(),
                        e,
                    )
                    .into());
                }
            };

            match event {
                Event::Start(e) => {
                    path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                    if capture.is_none()
                        && let Some(field) = Field::at_path(&path)
                        && !claimed[field.index()]
                    {
                        claimed[field.index()] = true;
                        capture = Some((field, String::new(), path.len()));
                    }
                }
                Event::Empty(e) => {
                    // Present but without text: claims the field, value stays absent
                    path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                    if let Some(field) = Field::at_path(&path) {
                        claimed[field.index()] = true;
                    }
                    path.pop();
                }
                Event::Text(e) => {
                    if let Some((_, text, depth)) = capture.as_mut()
                        && *depth == path.len()
                    {
                        let unescaped = e.unescape().map_err(|err| {
                            ParseError::malformed(
                                &self.source_name,
                                self.reader.buffer_position(),
                                err,
                            )
                        })?;
                        text.push_str(&unescaped);
                    }
                }
                Event::CData(e) => {
                    if let Some((_, text, depth)) = capture.as_mut()
                        && *depth == path.len()
                    {
                        let raw = std::str::from_utf8(&e).map_err(|err| {
                            ParseError::malformed(
                                &self.source_name,
                                self.reader.buffer_position(),
                                err,
                            )
                        })?;
                        text.push_str(raw);
                    }
                }
                Event::End(_) => {
                    if path.is_empty() {
                        return Ok(record);
                    }
                    if let Some((field, text, depth)) = capture.take() {
                        if depth == path.len() {
                            if !text.is_empty() {
                                record.set_first(field, text);
                            }
                        } else {
                            capture = Some((field, text, depth));
                        }
                    }
                    path.pop();
                }
                Event::Eof => {
                    return Err(ParseError::Truncated {
                        source_name: self.source_name.clone(),
                    }
                    .into());
                }
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordCursor<R> {
    type Item = Result<InstrumentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let outcome = match self.next_step() {
                Step::Skip => continue,
                Step::Eof => None,
                Step::EmptyRecord => Some(Ok(InstrumentRecord::default())),
                Step::RecordStart => Some(self.read_record()),
                Step::Truncated => Some(Err(ParseError::Truncated {
                    source_name: self.source_name.clone(),
                }
                .into())),
                Step::Failed(e) => Some(Err(ParseError::malformed(
                    &self.source_name,
                    self.reader.buffer_position(),
                    e,
                )
                .into())),
            };
            match &outcome {
                Some(Ok(_)) => self.records_read += 1,
                // Errors and end of input are terminal
                _ => self.finished = true,
            }
            return outcome;
        }
    }
}

fn is_record(ns: &ResolveResult<'_>, local_name: &[u8]) -> bool {
    local_name == RECORD_TAG.as_bytes()
        && matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == RECORD_NAMESPACE.as_bytes())
}
