//! Flat tabular rows and their CSV form

use super::record::{Field, InstrumentRecord};
use crate::error::{Error, ParseError, Result};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Derived column: occurrences of lowercase `a` in the full name
pub const A_COUNT_COLUMN: &str = "a_count";

/// Derived column: `YES` when `a_count > 0`, otherwise `NO`
pub const CONTAINS_A_COLUMN: &str = "contains_a";

/// Fixed output header, in column order
pub const HEADER: [&str; 8] = [
    "FinInstrmGnlAttrbts.Id",
    "FinInstrmGnlAttrbts.FullNm",
    "FinInstrmGnlAttrbts.ClssfctnTp",
    "FinInstrmGnlAttrbts.CmmdtyDerivInd",
    "FinInstrmGnlAttrbts.NtnlCcy",
    "Issr",
    A_COUNT_COLUMN,
    CONTAINS_A_COLUMN,
];

/// Count lowercase `a` characters (case-sensitive); absent names count 0
pub fn count_a(full_name: Option<&str>) -> usize {
    full_name.map_or(0, |name| name.matches('a').count())
}

/// A record plus its derived columns
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabularRow {
    record: InstrumentRecord,
    a_count: usize,
}

impl TabularRow {
    /// Derive the computed columns for `record`
    pub fn from_record(record: InstrumentRecord) -> Self {
        let a_count = count_a(record.full_name.as_deref());
        Self { record, a_count }
    }

    /// The extracted base fields
    pub fn record(&self) -> &InstrumentRecord {
        &self.record
    }

    /// Occurrences of `a` in the full name
    pub fn a_count(&self) -> usize {
        self.a_count
    }

    /// `"YES"` or `"NO"`
    pub fn contains_a(&self) -> &'static str {
        if self.a_count > 0 { "YES" } else { "NO" }
    }

    /// All eight cells as strings, absent fields empty
    pub fn cells(&self) -> Vec<String> {
        let mut cells: Vec<String> = Field::ALL
            .iter()
            .map(|field| self.record.get(*field).unwrap_or_default().to_string())
            .collect();
        cells.push(self.a_count.to_string());
        cells.push(self.contains_a().to_string());
        cells
    }
}

/// Ordered rows with the fixed [`HEADER`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TabularDataset {
    rows: Vec<TabularRow>,
}

impl TabularDataset {
    /// Empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain a record stream into a dataset, stopping at the first error
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<InstrumentRecord>>,
    {
        let mut dataset = Self::new();
        for record in records {
            dataset.push(record?);
        }
        Ok(dataset)
    }

    /// Append a record, deriving its computed columns
    pub fn push(&mut self, record: InstrumentRecord) {
        self.rows.push(TabularRow::from_record(record));
    }

    /// Rows in scan order
    pub fn rows(&self) -> &[TabularRow] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows were produced
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write header and rows as comma-delimited UTF-8
    ///
    /// Cells are quoted only when they contain a delimiter, quote or newline.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        csv.write_record(HEADER)?;
        for row in &self.rows {
            csv.write_record(row.cells())?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write the CSV to `path`
    ///
    /// Data goes to `<path>.partial` first and is renamed into place on
    /// success, so `path` never holds an incomplete file.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let partial = partial_path(path);
        let written = File::create(&partial)
            .map_err(Error::from)
            .and_then(|file| {
                let mut out = BufWriter::new(file);
                self.write_to(&mut out)?;
                out.flush()?;
                Ok(())
            })
            .and_then(|()| std::fs::rename(&partial, path).map_err(Error::from));

        if written.is_err() {
            let _ = std::fs::remove_file(&partial);
        }
        written
    }

    /// Read a CSV produced by [`TabularDataset::write_csv`]
    ///
    /// The header must match [`HEADER`] exactly and the derived columns must
    /// agree with the full name.
    pub fn read_csv(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::read_from(file, path)
    }

    /// Read CSV text from any reader; `path` labels errors
    pub fn read_from<R: Read>(reader: R, path: &Path) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let header = csv.headers()?;
        if header.iter().ne(HEADER) {
            return Err(ParseError::UnexpectedHeader {
                path: path.to_path_buf(),
                found: header.iter().collect::<Vec<_>>().join(","),
            }
            .into());
        }

        let mut dataset = Self::new();
        for result in csv.records() {
            let cells = result?;
            let line = cells.position().map_or(0, |p| p.line());
            let mut record = InstrumentRecord::default();
            for (field, cell) in Field::ALL.iter().zip(cells.iter()) {
                if !cell.is_empty() {
                    record.set_first(*field, cell.to_string());
                }
            }
            let row = TabularRow::from_record(record);

            let a_count = cells.get(6).unwrap_or_default();
            if a_count.parse::<usize>().ok() != Some(row.a_count()) {
                return Err(invalid(A_COUNT_COLUMN, a_count, line));
            }
            let contains_a = cells.get(7).unwrap_or_default();
            if contains_a != row.contains_a() {
                return Err(invalid(CONTAINS_A_COLUMN, contains_a, line));
            }
            dataset.rows.push(row);
        }
        Ok(dataset)
    }
}

fn invalid(column: &str, value: &str, line: u64) -> Error {
    ParseError::InvalidValue {
        column: column.to_string(),
        value: value.to_string(),
        line,
    }
    .into()
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".partial");
    PathBuf::from(name)
}
