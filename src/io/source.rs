//! Stage extract loading (CSV)
//!
//! Each extract is a headered CSV. Cells are trimmed; rows that fail to
//! deserialize are skipped and counted, never fatal. A missing booking code
//! column or an unreadable file fails the whole batch.

use crate::domain::types::{AbRecord, BcRecord, BookingCode, Stage};
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// A row type loadable from one stage extract
pub trait StageRow: DeserializeOwned {
    const STAGE: Stage;
    /// Accepted header names for the join key column
    const KEY_COLUMNS: &'static [&'static str];

    fn booking_code(&self) -> &BookingCode;
}

impl StageRow for AbRecord {
    const STAGE: Stage = Stage::AToB;
    const KEY_COLUMNS: &'static [&'static str] = &["booking_code"];

    fn booking_code(&self) -> &BookingCode {
        &self.booking_code
    }
}

impl StageRow for BcRecord {
    const STAGE: Stage = Stage::BToC;
    const KEY_COLUMNS: &'static [&'static str] = &["booking_code", "extracted_code"];

    fn booking_code(&self) -> &BookingCode {
        &self.booking_code
    }
}

/// Rows loaded from one extract
#[derive(Debug)]
pub struct StageExtract<T> {
    pub records: Vec<T>,
    /// Malformed rows skipped during loading
    pub rejected: u64,
}

impl<T> From<Vec<T>> for StageExtract<T> {
    fn from(records: Vec<T>) -> Self {
        Self { records, rejected: 0 }
    }
}

/// Load a stage extract from a CSV file
pub fn read_stage_file<T: StageRow>(path: impl AsRef<Path>) -> anyhow::Result<StageExtract<T>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} extract {}", T::STAGE.as_str(), path.display()))?;

    let extract = read_stage(file)
        .with_context(|| format!("Failed to read {} extract {}", T::STAGE.as_str(), path.display()))?;

    info!(
        stage = T::STAGE.as_str(),
        path = %path.display(),
        rows = extract.records.len(),
        rejected = extract.rejected,
        "stage_extract_loaded"
    );
    Ok(extract)
}

/// Load a stage extract from any CSV reader
pub fn read_stage<T: StageRow, R: Read>(reader: R) -> anyhow::Result<StageExtract<T>> {
    let mut csv_reader =
        csv::ReaderBuilder::new().trim(csv::Trim::All).flexible(true).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    debug!(stage = T::STAGE.as_str(), columns = ?headers, "stage_extract_columns");

    if !headers.iter().any(|h| T::KEY_COLUMNS.contains(&h)) {
        bail!(
            "no booking code column (expected one of {:?}, found {:?})",
            T::KEY_COLUMNS,
            headers.iter().collect::<Vec<_>>()
        );
    }

    let mut records = Vec::new();
    let mut rejected = 0u64;

    for result in csv_reader.deserialize::<T>() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                rejected += 1;
                warn!(
                    stage = T::STAGE.as_str(),
                    line = ?e.position().map(|p| p.line()),
                    error = %e,
                    "stage_row_rejected"
                );
            }
        }
    }

    Ok(StageExtract { records, rejected })
}
