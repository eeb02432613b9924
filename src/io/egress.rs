//! Report egress - writes the final report and batch summary to files
//!
//! The report is written once per batch, replacing any previous file:
//! - CSV: header row plus one row per booking, columns in report order
//! - JSONL: one JSON object per booking, same keys
//!
//! The batch summary is a single pretty-printed JSON document.

use crate::domain::record::{ReportRow, REPORT_COLUMNS};
use crate::infra::config::OutputFormat;
use crate::infra::metrics::BatchSummary;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Egress writer for the report table
pub struct ReportEgress {
    file_path: String,
    format: OutputFormat,
}

impl ReportEgress {
    pub fn new(file_path: &str, format: OutputFormat) -> Self {
        info!(file_path = %file_path, format = format.as_str(), "egress_initialized");
        Self { file_path: file_path.to_string(), format }
    }

    /// Write all report rows, returning the number written
    pub fn write_report(&self, rows: &[ReportRow]) -> anyhow::Result<usize> {
        let file = create_file(&self.file_path)
            .with_context(|| format!("Failed to create report file {}", self.file_path))?;

        match self.format {
            OutputFormat::Csv => write_csv(file, rows),
            OutputFormat::Jsonl => write_jsonl(file, rows),
        }
        .with_context(|| format!("Failed to write report file {}", self.file_path))?;

        info!(
            file = %self.file_path,
            format = self.format.as_str(),
            rows = rows.len(),
            "report_egressed"
        );
        Ok(rows.len())
    }
}

/// Write the batch summary as JSON
pub fn write_summary(file_path: &str, summary: &BatchSummary) -> anyhow::Result<()> {
    let file = create_file(file_path)
        .with_context(|| format!("Failed to create summary file {}", file_path))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary)
        .with_context(|| format!("Failed to write summary file {}", file_path))?;
    writeln!(writer)?;
    writer.flush()?;

    info!(file = %file_path, batch_id = %summary.batch_id, "summary_egressed");
    Ok(())
}

/// Create (or truncate) a file, creating parent directories if they don't exist
fn create_file(file_path: &str) -> std::io::Result<File> {
    let path = Path::new(file_path);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    File::create(path)
}

fn write_csv(file: File, rows: &[ReportRow]) -> anyhow::Result<()> {
    // Header written explicitly so an empty report still carries it
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(REPORT_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_jsonl(file: File, rows: &[ReportRow]) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(file);
    for row in rows {
        let line = serde_json::to_string(row)?;
        writeln!(writer, "{}", line)?;
        debug!(booking_code = %row.booking_code, bytes = line.len(), "report_row_written");
    }
    writer.flush()?;
    Ok(())
}
