//! Delimited text reader with header handling and a per-field length guard
//!
//! The reader owns its source for its whole lifetime; dropping it closes the
//! underlying file on every exit path, including early termination of a
//! record stream.
//!
//! Fields are read as bytes. Anything that is not valid UTF-8 is decoded as
//! Windows-1252 instead of failing the row.

use std::borrow::Cow;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use csv::ByteRecord;
use encoding_rs::WINDOWS_1252;
use tracing::{debug, info, warn};

use crate::app::models::Row;
use crate::config::ReaderConfig;
use crate::{Error, Result};

/// Row-oriented reader over a delimited text source
#[derive(Debug)]
pub struct TabularReader<R: Read = File> {
    reader: csv::Reader<R>,
    source: String,
    max_field_length: usize,
    header: Option<Row>,
    header_read: bool,
    rows_read: usize,
    record: ByteRecord,
}

impl TabularReader<File> {
    /// Open a delimited file
    ///
    /// Fails with [`Error::SourceNotFound`] if the file does not exist.
    pub fn open(path: &Path, config: &ReaderConfig) -> Result<Self> {
        info!("Opening delimited source: {}", path.display());

        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::source_not_found(path.display().to_string()),
            _ => Error::io(format!("Failed to open {}", path.display()), e),
        })?;

        Self::with_source(file, path.display().to_string(), config)
    }
}

impl<R: Read> TabularReader<R> {
    /// Wrap any byte source, such as stdin or an in-memory buffer
    pub fn from_reader(reader: R, config: &ReaderConfig) -> Result<Self> {
        Self::with_source(reader, "<stream>".to_string(), config)
    }

    fn with_source(reader: R, source: String, config: &ReaderConfig) -> Result<Self> {
        config.validate()?;
        let delimiter = config.delimiter_byte()?;

        // Header handling and ragged rows are dealt with here, not by the csv layer
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        Ok(Self {
            reader,
            source,
            max_field_length: config.max_field_length,
            header: None,
            header_read: false,
            rows_read: 0,
            record: ByteRecord::new(),
        })
    }

    /// Consume the first row as the header
    ///
    /// Must be called at most once and before any [`read_row`](Self::read_row).
    /// An empty source yields an empty header.
    pub fn read_header(&mut self) -> Result<Row> {
        if self.header_read {
            return Err(Error::invalid_reader_state(format!(
                "header of {} was already read",
                self.source
            )));
        }
        if self.rows_read > 0 {
            return Err(Error::invalid_reader_state(format!(
                "header of {} requested after {} data rows",
                self.source, self.rows_read
            )));
        }
        self.header_read = true;

        let header = self.next_cells(0)?.unwrap_or_default();
        debug!("Read header with {} columns from {}", header.len(), self.source);
        self.header = Some(header.clone());
        Ok(header)
    }

    /// Read the next data row, or `None` at end of data
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        let row = self.next_cells(self.rows_read + 1)?;
        if row.is_some() {
            self.rows_read += 1;
        }
        Ok(row)
    }

    /// Iterate over the remaining data rows
    pub fn rows(&mut self) -> impl Iterator<Item = Result<Row>> + '_ {
        let mut failed = false;
        std::iter::from_fn(move || {
            if failed {
                return None;
            }
            match self.read_row() {
                Ok(row) => row.map(Ok),
                Err(e) => {
                    failed = true;
                    Some(Err(e))
                }
            }
        })
    }

    /// Header consumed by [`read_header`](Self::read_header), if any
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Number of data rows read so far
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Display name of the underlying source
    pub fn source(&self) -> &str {
        &self.source
    }

    fn next_cells(&mut self, row_number: usize) -> Result<Option<Row>> {
        let has_record = self.reader.read_byte_record(&mut self.record).map_err(|e| {
            Error::row_read(
                row_number,
                format!("malformed delimited data in {}: {}", self.source, e),
                Some(e),
            )
        })?;

        if !has_record {
            return Ok(None);
        }

        let max = self.max_field_length;
        let mut legacy_fields = 0;
        let cells = self
            .record
            .iter()
            .map(|bytes| {
                let field = match decode_field(bytes) {
                    Decoded::Utf8(field) => field,
                    Decoded::Legacy(field) => {
                        legacy_fields += 1;
                        field
                    }
                };
                let kept = truncate_field(&field, max);
                if kept.len() < field.len() {
                    debug!(
                        "Truncated field of {} bytes to {} bytes in row {}",
                        field.len(),
                        kept.len(),
                        row_number
                    );
                }
                kept.to_string()
            })
            .collect();

        if legacy_fields > 0 {
            warn!(
                "Row {} of {} has {} field(s) that are not valid UTF-8; decoded as Windows-1252",
                row_number, self.source, legacy_fields
            );
        }

        Ok(Some(cells))
    }
}

/// A field decoded from raw bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<'a> {
    Utf8(Cow<'a, str>),
    /// The bytes were not UTF-8 and were read as Windows-1252
    Legacy(Cow<'a, str>),
}

/// Decode a field as UTF-8, falling back to Windows-1252
///
/// Spreadsheet exports saved as "CSV" on Windows use Windows-1252, where
/// every byte maps to a character, so the fallback never fails.
pub fn decode_field(bytes: &[u8]) -> Decoded<'_> {
    match std::str::from_utf8(bytes) {
        Ok(field) => Decoded::Utf8(Cow::Borrowed(field)),
        Err(_) => {
            let (field, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            Decoded::Legacy(field)
        }
    }
}

/// Truncate a field to at most `max_len` bytes without splitting a character
pub fn truncate_field(value: &str, max_len: usize) -> &str {
    if value.len() <= max_len {
        return value;
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
