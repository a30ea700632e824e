//! JSON Lines output for generated records.

use model_core::Record;
use std::io::{BufWriter, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default buffer size for JSONL writing.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Metrics from a generate run.
#[derive(Debug, Clone, Default)]
pub struct WriteMetrics {
    /// Number of records written.
    pub records_written: u64,
    /// Total time taken.
    pub total_duration: Duration,
    /// Time spent generating records.
    pub generation_duration: Duration,
    /// Time spent serializing and writing records.
    pub write_duration: Duration,
}

impl WriteMetrics {
    pub fn records_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.records_written as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Write each record as one JSON object per line.
///
/// `records` is drained lazily so generation and write times are measured
/// separately.
pub fn write_jsonl<W, I>(writer: W, records: I) -> std::io::Result<WriteMetrics>
where
    W: Write,
    I: IntoIterator<Item = Record>,
{
    let start_time = Instant::now();
    let mut metrics = WriteMetrics::default();
    let mut writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, writer);
    let mut records = records.into_iter();

    loop {
        let gen_start = Instant::now();
        let Some(record) = records.next() else {
            break;
        };
        metrics.generation_duration += gen_start.elapsed();

        let write_start = Instant::now();
        serde_json::to_writer(&mut writer, &record)?;
        writeln!(writer)?;
        metrics.write_duration += write_start.elapsed();

        metrics.records_written += 1;
        if metrics.records_written % 10000 == 0 {
            debug!("Written {} records", metrics.records_written);
        }
    }

    writer.flush()?;
    metrics.total_duration = start_time.elapsed();

    info!(
        "Wrote {} records in {:?} ({:.2} records/sec)",
        metrics.records_written,
        metrics.total_duration,
        metrics.records_per_second()
    );
    Ok(metrics)
}
