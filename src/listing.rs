//! Listing document parsing and download-link resolution
//!
//! The listing is a small solr-style XML response:
//!
//! ```xml
//! <response>
//!   <result name="response">
//!     <doc>
//!       <str name="file_type">DLTINS</str>
//!       <str name="download_link">http://example.com/dltins.zip</str>
//!     </doc>
//!   </result>
//! </response>
//! ```
//!
//! `doc` elements may appear at any depth. Resolution picks the first `doc`
//! whose `file_type` equals the requested classification and that carries a
//! `download_link`.

use crate::error::{ParseError, Result};
use crate::types::LinkResolution;
use quick_xml::events::{BytesStart, Event};
use std::io::BufRead;
use std::path::Path;
use tracing::debug;

const DOC_TAG: &[u8] = b"doc";
const FIELD_TAG: &[u8] = b"str";
const FILE_TYPE: &str = "file_type";
const DOWNLOAD_LINK: &str = "download_link";

/// One `doc` element of the listing
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingEntry {
    /// Value of `<str name="file_type">`
    pub file_type: Option<String>,
    /// Value of `<str name="download_link">`
    pub download_link: Option<String>,
}

/// The parsed listing, entries in document order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingDocument {
    entries: Vec<ListingEntry>,
}

/// Which named `str` field of a `doc` is being read
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    FileType,
    DownloadLink,
}

impl ListingDocument {
    /// Entries in document order
    pub fn entries(&self) -> &[ListingEntry] {
        &self.entries
    }

    /// Read the listing file at `path`
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let name = path.display().to_string();
        Self::parse(std::io::BufReader::new(file), &name)
    }

    /// Parse a listing from any buffered reader
    ///
    /// `source_name` only labels parse errors.
    pub fn parse<R: BufRead>(input: R, source_name: &str) -> Result<Self> {
        let mut reader = quick_xml::Reader::from_reader(input);
        let mut buf = Vec::new();
        let mut entries = Vec::new();
        let mut current: Option<ListingEntry> = None;
        let mut slot: Option<(Slot, String)> = None;
        let mut depth = 0usize;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| ParseError::malformed(source_name, reader.buffer_position(), e))?;

            match event {
                Event::Start(e) => {
                    depth += 1;
                    match e.local_name().as_ref() {
                        DOC_TAG => current = Some(ListingEntry::default()),
                        FIELD_TAG if current.is_some() => {
                            slot = field_slot(&e, source_name, reader.buffer_position())?
                                .map(|s| (s, String::new()));
                        }
                        _ => {}
                    }
                }
                Event::Empty(e) if e.local_name().as_ref() == DOC_TAG => {
                    entries.push(ListingEntry::default());
                }
                Event::Text(e) => {
                    if let Some((_, text)) = slot.as_mut() {
                        let unescaped = e.unescape().map_err(|err| {
                            ParseError::malformed(source_name, reader.buffer_position(), err)
                        })?;
                        text.push_str(&unescaped);
                    }
                }
                Event::CData(e) => {
                    if let Some((_, text)) = slot.as_mut() {
                        let raw = std::str::from_utf8(&e).map_err(|err| {
                            ParseError::malformed(source_name, reader.buffer_position(), err)
                        })?;
                        text.push_str(raw);
                    }
                }
                Event::End(e) => {
                    depth = depth.saturating_sub(1);
                    match e.local_name().as_ref() {
                        FIELD_TAG => {
                            if let (Some(entry), Some((which, text))) =
                                (current.as_mut(), slot.take())
                            {
                                assign_first(entry, which, text);
                            }
                        }
                        DOC_TAG => {
                            if let Some(entry) = current.take() {
                                entries.push(entry);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof if depth > 0 => {
                    return Err(ParseError::Truncated {
                        source_name: source_name.to_string(),
                    }
                    .into());
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        debug!(source_name, entries = entries.len(), "listing parsed");
        Ok(Self { entries })
    }

    /// Find the download link for `classification` (exact, case-sensitive)
    ///
    /// The first matching entry that carries a link wins. `match_count`
    /// counts every entry with the classification, linked or not. A
    /// `download_link` element with empty text counts as no link, so such an
    /// entry is passed over in favour of a later one.
    pub fn resolve(&self, classification: &str) -> LinkResolution {
        let mut matching = self
            .entries
            .iter()
            .filter(|entry| entry.file_type.as_deref() == Some(classification));

        let mut match_count = 0;
        let mut link = None;
        for entry in matching.by_ref() {
            match_count += 1;
            if entry.download_link.is_some() {
                link = entry.download_link.clone();
                break;
            }
        }
        match_count += matching.count();

        LinkResolution { link, match_count }
    }
}

/// Read the listing at `path` and resolve `classification` in one step
pub fn resolve_link(path: &Path, classification: &str) -> Result<LinkResolution> {
    Ok(ListingDocument::from_path(path)?.resolve(classification))
}

fn field_slot(e: &BytesStart<'_>, source_name: &str, position: u64) -> Result<Option<Slot>> {
    let attr = e
        .try_get_attribute("name")
        .map_err(|err| ParseError::malformed(source_name, position, err))?;
    let Some(attr) = attr else {
        return Ok(None);
    };
    let value = attr
        .unescape_value()
        .map_err(|err| ParseError::malformed(source_name, position, err))?;
    Ok(match value.as_ref() {
        FILE_TYPE => Some(Slot::FileType),
        DOWNLOAD_LINK => Some(Slot::DownloadLink),
        _ => None,
    })
}

// Empty text reads as absent; repeated fields keep their first value.
fn assign_first(entry: &mut ListingEntry, which: Slot, text: String) {
    if text.is_empty() {
        return;
    }
    let target = match which {
        Slot::FileType => &mut entry.file_type,
        Slot::DownloadLink => &mut entry.download_link,
    };
    if target.is_none() {
        *target = Some(text);
    }
}
