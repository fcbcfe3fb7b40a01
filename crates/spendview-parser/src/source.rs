//! Decoding of one exported file into raw rows
//!
//! The exports are semicolon separated, double-quote quoted, and start with a
//! header naming the seven columns in a fixed order.

use csv::{ReaderBuilder, StringRecord};

use crate::error::SourceError;
use crate::types::{Column, RawRow};

/// The rows of one export, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSource {
    /// Identifier used when reporting rejected rows (usually the file name)
    pub id: String,
    pub rows: Vec<RawRow>,
}

impl RowSource {
    pub fn new(id: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self {
            id: id.into(),
            rows,
        }
    }

    /// Decode delimited text, checking the header before reading any row
    pub fn from_delimited(id: impl Into<String>, text: &str) -> Result<Self, SourceError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .quote(b'"')
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let header = reader.headers().map_err(|e| malformed(1, e))?.clone();
        check_header(&header)?;

        let mut rows = Vec::new();
        for (position, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or(position as u64 + 2);
                malformed(line, e)
            })?;
            rows.push(RawRow::new(
                position + 1,
                record.iter().map(str::to_string).collect(),
            ));
        }

        log::debug!("Decoded {} rows", rows.len());

        Ok(Self::new(id, rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Expected header names in column order
pub fn expected_header() -> Vec<String> {
    Column::ALL.iter().map(|c| c.header().to_string()).collect()
}

fn check_header(header: &StringRecord) -> Result<(), SourceError> {
    let found: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

    if found.iter().all(|h| h.is_empty()) {
        return Err(SourceError::MissingHeader);
    }

    let expected = expected_header();
    if found != expected {
        return Err(SourceError::HeaderMismatch { expected, found });
    }

    Ok(())
}

fn malformed(line: u64, error: csv::Error) -> SourceError {
    SourceError::Malformed {
        line,
        message: error.to_string(),
    }
}
