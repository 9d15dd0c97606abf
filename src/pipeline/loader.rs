//! Load entry points: streaming from a file or reader, or from records
//! already in memory.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tokio::io::AsyncRead;

use crate::config::LoadOptions;
use crate::error_handling::{LoadError, LoadStats, SkipReason};
use crate::record::{parse_record, Record};

use super::coordinator::Coordinator;
use super::sink::BatchSink;
use super::source::{LineSource, RawRow};

/// Outcome of a successful load run.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    /// Data rows the source yielded (header excluded)
    pub rows_read: usize,
    /// Rows that parsed into records
    pub records_parsed: usize,
    /// Rows or records skipped for any reason
    pub records_skipped: usize,
    pub batches_written: usize,
    pub records_written: usize,
    pub elapsed: Duration,
}

impl LoadReport {
    fn from_stats(stats: &LoadStats, elapsed: Duration) -> Self {
        Self {
            rows_read: stats.rows_read(),
            records_parsed: stats.records_parsed(),
            records_skipped: stats.total_skipped(),
            batches_written: stats.batches_written(),
            records_written: stats.records_written(),
            elapsed,
        }
    }

    pub fn records_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.records_written as f64 / secs
        } else {
            0.0
        }
    }
}

/// Runs loads through one sink with fixed options.
///
/// Statistics are shared by every run of the same loader, so a report covers
/// all runs so far. Use a fresh loader per measured run.
pub struct Loader {
    sink: Arc<dyn BatchSink>,
    options: LoadOptions,
    stats: Arc<LoadStats>,
}

impl Loader {
    pub fn new(sink: Arc<dyn BatchSink>, options: LoadOptions) -> Self {
        Self {
            sink,
            options,
            stats: Arc::new(LoadStats::new()),
        }
    }

    /// Reports into externally owned statistics (e.g. for progress logging).
    pub fn with_stats(mut self, stats: Arc<LoadStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn stats(&self) -> Arc<LoadStats> {
        Arc::clone(&self.stats)
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Streams a CSV file into the sink.
    ///
    /// # Errors
    ///
    /// [`LoadError::InvalidOptions`] or [`LoadError::SourceOpen`] before any
    /// writer starts; otherwise the first write failure of the run.
    pub async fn load_path(&self, path: &Path) -> Result<LoadReport, LoadError> {
        self.options.validate()?;
        let source = LineSource::open(path).await?;
        info!(
            "Loading {} into {} (batch size {}, {} writers)",
            path.display(),
            self.sink.name(),
            self.options.batch_size,
            self.options.effective_workers()
        );
        self.stream(source).await
    }

    /// Streams CSV from any async reader into the sink.
    pub async fn load_reader<R>(&self, reader: R) -> Result<LoadReport, LoadError>
    where
        R: AsyncRead + Unpin + Send,
    {
        self.options.validate()?;
        self.stream(LineSource::new(reader)).await
    }

    /// Loads records that were read and parsed beforehand.
    ///
    /// Only writes are counted here. Rows read and skipped belong to whoever
    /// read them, e.g. [`Loader::read_all`].
    pub async fn load_records(&self, records: Vec<Record>) -> Result<LoadReport, LoadError> {
        self.options.validate()?;
        let started = Instant::now();
        self.dispatch(records).await?;
        Ok(self.report(started))
    }

    /// Reads and parses a whole CSV file into memory, counting rows and skips
    /// into this loader's statistics.
    pub async fn read_all(&self, path: &Path) -> Result<Vec<Record>, LoadError> {
        let mut source = LineSource::open(path).await?.with_stats(self.stats());
        let records = read_records(&mut source, &self.stats, usize::MAX).await;
        info!("Read {} records from {}", records.len(), path.display());
        Ok(records)
    }

    /// Loads a CSV file `chunk_size` records at a time.
    ///
    /// Each chunk is read into memory and written through its own writer pool
    /// before the next chunk is read. The first failing chunk ends the run;
    /// chunks written before it stay written.
    ///
    /// # Errors
    ///
    /// [`LoadError::InvalidOptions`] when `chunk_size` is 0, otherwise the same
    /// as [`Loader::load_path`].
    pub async fn load_chunked(&self, path: &Path, chunk_size: usize) -> Result<LoadReport, LoadError> {
        self.options.validate()?;
        if chunk_size == 0 {
            return Err(LoadError::InvalidOptions(
                "chunk size must be at least 1".to_string(),
            ));
        }
        let mut source = LineSource::open(path).await?.with_stats(self.stats());
        info!(
            "Loading {} into {} in chunks of {} (batch size {}, {} writers)",
            path.display(),
            self.sink.name(),
            chunk_size,
            self.options.batch_size,
            self.options.effective_workers()
        );

        let started = Instant::now();
        let mut chunks = 0usize;
        loop {
            let chunk = read_records(&mut source, &self.stats, chunk_size).await;
            if chunk.is_empty() {
                break;
            }
            chunks += 1;
            debug!("Chunk {} holds {} records", chunks, chunk.len());
            self.dispatch(chunk).await?;
        }
        Ok(self.report(started))
    }

    async fn dispatch(&self, records: Vec<Record>) -> Result<(), LoadError> {
        let mut coordinator =
            Coordinator::start(Arc::clone(&self.sink), &self.options, Arc::clone(&self.stats));
        for record in records {
            if !coordinator.push(record).await {
                break;
            }
        }
        coordinator.finish().await
    }

    async fn stream<R>(&self, source: LineSource<R>) -> Result<LoadReport, LoadError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let started = Instant::now();
        let mut source = source.with_stats(Arc::clone(&self.stats));
        let mut coordinator =
            Coordinator::start(Arc::clone(&self.sink), &self.options, Arc::clone(&self.stats));

        while let Some(row) = source.next_row().await {
            if let Some(record) = parse_row(&row, &self.stats) {
                if !coordinator.push(record).await {
                    break;
                }
            }
        }

        coordinator.finish().await?;
        Ok(self.report(started))
    }

    fn report(&self, started: Instant) -> LoadReport {
        let report = LoadReport::from_stats(&self.stats, started.elapsed());
        info!(
            "Wrote {} records in {} batches ({} skipped) in {:.2}s ({:.0} records/sec)",
            report.records_written,
            report.batches_written,
            report.records_skipped,
            report.elapsed.as_secs_f64(),
            report.records_per_second()
        );
        report
    }
}

/// Streams `path` into `sink` with `batch_size` records per batch and
/// `workers` concurrent writers.
///
/// # Examples
///
/// ```no_run
/// # async fn demo(sink: std::sync::Arc<dyn bulkload_bench::BatchSink>) -> Result<(), bulkload_bench::LoadError> {
/// let report = bulkload_bench::load_streaming("alumnos.csv", sink, 5000, 16).await?;
/// println!("{} records", report.records_written);
/// # Ok(())
/// # }
/// ```
pub async fn load_streaming(
    path: impl AsRef<Path>,
    sink: Arc<dyn BatchSink>,
    batch_size: usize,
    workers: usize,
) -> Result<LoadReport, LoadError> {
    Loader::new(sink, LoadOptions::new(batch_size, workers))
        .load_path(path.as_ref())
        .await
}

/// Reads and parses a whole CSV file into memory, skipping invalid rows.
pub async fn read_all_records(path: &Path) -> Result<Vec<Record>, LoadError> {
    let stats = LoadStats::new();
    let mut source = LineSource::open(path).await?;
    let records = read_records(&mut source, &stats, usize::MAX).await;
    info!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

fn parse_row(row: &RawRow, stats: &LoadStats) -> Option<Record> {
    stats.record_row_read();
    match parse_record(row.fields().as_slice()) {
        Ok(record) => {
            stats.record_parsed();
            Some(record)
        }
        Err(e) => {
            warn!("Skipping line {}: {e}", row.line);
            stats.record_skip(SkipReason::from(&e));
            None
        }
    }
}

/// Parses rows until `limit` records are collected or the source ends.
async fn read_records<R>(
    source: &mut LineSource<R>,
    stats: &LoadStats,
    limit: usize,
) -> Vec<Record>
where
    R: AsyncRead + Unpin + Send,
{
    let mut records = Vec::new();
    while records.len() < limit {
        let Some(row) = source.next_row().await else {
            break;
        };
        if let Some(record) = parse_row(&row, stats) {
            records.push(record);
        }
    }
    records
}
