//! Line source: lazily yields raw CSV rows from a byte stream.
//!
//! The first row is always treated as the header and skipped. Rows with an
//! unexpected number of columns are passed through untouched; checking the
//! field count is the parser's job.

use std::path::Path;
use std::sync::Arc;

use csv_async::{AsyncReader, AsyncReaderBuilder, StringRecord};
use log::{debug, error, warn};
use tokio::io::AsyncRead;

use crate::config::MAX_CONSECUTIVE_DECODE_ERRORS;
use crate::error_handling::{LoadError, LoadStats, RowDecodeError, SkipReason};

/// One raw data row as read from the input.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// Input line the row started on (1-based, header is line 1)
    pub line: u64,
    pub fields: StringRecord,
}

impl RawRow {
    pub fn fields(&self) -> Vec<&str> {
        self.fields.iter().collect()
    }
}

/// Single-pass, forward-only sequence of raw rows.
///
/// Restarting means opening the underlying stream again.
pub struct LineSource<R> {
    reader: AsyncReader<R>,
    header_skipped: bool,
    exhausted: bool,
    decode_errors: usize,
    stats: Option<Arc<LoadStats>>,
}

impl LineSource<tokio::fs::File> {
    /// Opens a CSV file for streaming.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::SourceOpen`] if the file cannot be opened.
    pub async fn open(path: &Path) -> Result<Self, LoadError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|source| LoadError::SourceOpen {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(file))
    }
}

impl<R> LineSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        let reader = AsyncReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .create_reader(reader);
        Self {
            reader,
            header_skipped: false,
            exhausted: false,
            decode_errors: 0,
            stats: None,
        }
    }

    /// Counts skipped rows into shared load statistics.
    pub fn with_stats(mut self, stats: Arc<LoadStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Rows skipped so far because they could not be decoded.
    pub fn decode_errors(&self) -> usize {
        self.decode_errors
    }

    /// Returns the next data row, or `None` at end of input.
    ///
    /// Undecodable rows are logged, counted and skipped. An unreadable header
    /// row ends the sequence immediately, the same as an empty input.
    pub async fn next_row(&mut self) -> Option<RawRow> {
        if self.exhausted {
            return None;
        }

        if !self.header_skipped {
            self.header_skipped = true;
            let mut header = StringRecord::new();
            match self.reader.read_record(&mut header).await {
                Ok(true) => debug!("Skipped header row: {:?}", header),
                Ok(false) => {
                    debug!("Source is empty");
                    self.exhausted = true;
                    return None;
                }
                Err(e) => {
                    warn!("Header row is unreadable, treating source as empty: {e}");
                    self.exhausted = true;
                    return None;
                }
            }
        }

        let mut consecutive_errors = 0usize;
        loop {
            let mut fields = StringRecord::new();
            match self.reader.read_record(&mut fields).await {
                Ok(true) => {
                    let line = fields
                        .position()
                        .map(|p| p.line())
                        .unwrap_or_else(|| self.reader.position().line());
                    return Some(RawRow { line, fields });
                }
                Ok(false) => {
                    self.exhausted = true;
                    return None;
                }
                Err(source) => {
                    let err = RowDecodeError {
                        line: self.reader.position().line(),
                        source,
                    };
                    warn!("Skipping row: {err}");
                    self.decode_errors += 1;
                    if let Some(stats) = &self.stats {
                        stats.record_skip(SkipReason::RowDecode);
                    }

                    consecutive_errors += 1;
                    if consecutive_errors >= MAX_CONSECUTIVE_DECODE_ERRORS {
                        error!(
                            "Giving up on source after {} consecutive undecodable rows",
                            consecutive_errors
                        );
                        self.exhausted = true;
                        return None;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(input: &[u8]) -> (Vec<Vec<String>>, usize) {
        let mut source = LineSource::new(input);
        let mut rows = Vec::new();
        while let Some(row) = source.next_row().await {
            rows.push(row.fields().iter().map(|s| s.to_string()).collect());
        }
        (rows, source.decode_errors())
    }

    #[tokio::test]
    async fn test_skips_header_row() {
        let input = b"a,b,c\n1,2,3\n4,5,6\n";
        let (rows, errors) = collect(input).await;
        assert_eq!(rows, vec![vec!["1", "2", "3"], vec!["4", "5", "6"]]);
        assert_eq!(errors, 0);
    }

    #[tokio::test]
    async fn test_header_only_is_empty() {
        let (rows, _) = collect(b"apellido,nombre\n").await;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_is_empty() {
        let (rows, _) = collect(b"").await;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_header_skipped_even_if_it_looks_like_data() {
        let input = b"Araya,Valentino\nPerez,Juan\n";
        let (rows, _) = collect(input).await;
        assert_eq!(rows, vec![vec!["Perez", "Juan"]]);
    }

    #[tokio::test]
    async fn test_tolerates_inconsistent_field_counts() {
        let input = b"h1,h2,h3\n1,2,3\n1\n1,2,3,4,5\n";
        let (rows, errors) = collect(input).await;
        let lens: Vec<usize> = rows.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![3, 1, 5]);
        assert_eq!(errors, 0);
    }

    #[tokio::test]
    async fn test_invalid_utf8_row_is_skipped() {
        let mut input = b"h1,h2\nok,1\n".to_vec();
        input.extend_from_slice(&[0xff, 0xfe, b',', b'2', b'\n']);
        input.extend_from_slice(b"also ok,3\n");

        let mut source = LineSource::new(input.as_slice());
        let mut values = Vec::new();
        while let Some(row) = source.next_row().await {
            values.push(row.fields.get(0).unwrap_or_default().to_string());
        }

        assert_eq!(values, vec!["ok", "also ok"]);
        assert_eq!(source.decode_errors(), 1);
    }

    #[tokio::test]
    async fn test_quoted_fields_with_commas() {
        let input = b"h1,h2\n\"Perez, Juan\",2\n";
        let (rows, _) = collect(input).await;
        assert_eq!(rows, vec![vec!["Perez, Juan", "2"]]);
    }

    #[tokio::test]
    async fn test_row_line_numbers() {
        let input = b"h\na\nb\n";
        let mut source = LineSource::new(&input[..]);
        let first = source.next_row().await.expect("first row");
        let second = source.next_row().await.expect("second row");
        assert_eq!(first.line, 2);
        assert_eq!(second.line, 3);
        assert!(source.next_row().await.is_none());
        assert!(source.next_row().await.is_none());
    }

    #[tokio::test]
    async fn test_open_missing_file_is_source_open_error() {
        let result = LineSource::open(Path::new("definitely/not/here.csv")).await;
        assert!(matches!(result, Err(LoadError::SourceOpen { .. })));
    }
}
