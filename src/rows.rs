//! Headerless single-column CSV to [`TextRecord`]s.
//!
//! The one logical column is the text to classify. Standard CSV quoting
//! applies, so `"a, b"` is a single field. Surrounding whitespace is trimmed
//! and blank rows are skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};

use crate::domain::TextRecord;
use crate::error::RowExtractionError;

/// Lazy, single-pass iterator over the text records of a CSV source.
pub struct TextRecords<R> {
    inner: StringRecordsIntoIter<R>,
    next_index: usize,
}

impl TextRecords<File> {
    /// Open a file for record extraction.
    pub fn open(path: &Path) -> Result<Self, RowExtractionError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> TextRecords<R> {
    pub fn from_reader(reader: R) -> Self {
        let inner = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader)
            .into_records();

        Self {
            inner,
            next_index: 0,
        }
    }

    fn text_record_from(
        &mut self,
        record: &StringRecord,
    ) -> Result<Option<TextRecord>, RowExtractionError> {
        // Trailing empty cells ("text,,") still count as one column.
        let filled = record
            .as_byte_record()
            .iter()
            .rposition(|field| !field.is_empty())
            .map_or(0, |i| i + 1);
        if filled > 1 {
            return Err(RowExtractionError::UnexpectedColumns {
                line: record.position().map_or(0, |pos| pos.line()),
                found: filled,
            });
        }

        let text = record.get(0).unwrap_or_default();
        if text.is_empty() {
            return Ok(None);
        }

        let index = self.next_index;
        self.next_index += 1;
        Ok(Some(TextRecord::new(index, text)))
    }
}

impl<R: Read> Iterator for TextRecords<R> {
    type Item = Result<TextRecord, RowExtractionError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.inner.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e.into())),
            };
            match self.text_record_from(&record) {
                Ok(Some(text_record)) => return Some(Ok(text_record)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Drain `records`, stopping at the first error.
///
/// Fails with [`RowExtractionError::Empty`] when nothing is classifiable and
/// with [`RowExtractionError::TooManyRows`] as soon as `max_rows` is exceeded.
pub fn collect_records<I>(
    records: I,
    max_rows: usize,
) -> Result<Vec<TextRecord>, RowExtractionError>
where
    I: IntoIterator<Item = Result<TextRecord, RowExtractionError>>,
{
    let mut collected = Vec::new();
    for record in records {
        if collected.len() == max_rows {
            return Err(RowExtractionError::TooManyRows { limit: max_rows });
        }
        collected.push(record?);
    }

    if collected.is_empty() {
        return Err(RowExtractionError::Empty);
    }
    Ok(collected)
}

/// Read every text record of the CSV file at `path`. Blocking.
pub fn read_records(path: &Path, max_rows: usize) -> Result<Vec<TextRecord>, RowExtractionError> {
    collect_records(TextRecords::open(path)?, max_rows)
}
