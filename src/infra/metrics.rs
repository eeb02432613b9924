//! Batch diagnostics and end-of-run summary
//!
//! Counters are recorded while the batch loads, parses and joins; the summary
//! is computed once over the classified records. Only records with a parseable
//! total contribute to latency statistics.

use crate::domain::breach::BreachCategory;
use crate::domain::duration::{DurationFormat, DurationParseError, ParsedDuration};
use crate::domain::record::ClassifiedRecord;
use crate::domain::types::Stage;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Total latency histogram bucket boundaries (seconds)
/// Buckets: ≤5m, ≤10m, ≤15m, ≤30m, ≤1h, ≤2h, ≤4h, ≤8h, ≤1d, ≤2d, >2d
const BUCKET_BOUNDS_SECS: [u64; 10] = [300, 600, 900, 1800, 3600, 7200, 14400, 28800, 86400, 172800];
const NUM_BUCKETS: usize = 11;

/// Compute bucket index for a latency value using binary search
#[inline]
fn bucket_index(latency_secs: u64) -> usize {
    BUCKET_BOUNDS_SECS.partition_point(|&bound| bound < latency_secs)
}

/// Nearest-rank percentile over an ascending slice
fn percentile_nearest_rank(sorted: &[f64], percentile: usize) -> Option<f64> {
    if sorted.is_empty() || !(1..=100).contains(&percentile) {
        return None;
    }

    let rank = (percentile * sorted.len()).div_ceil(100);
    sorted.get(rank.saturating_sub(1)).copied()
}

/// Per-extract row counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    /// Rows deserialized successfully
    pub rows: u64,
    /// Rows skipped as malformed
    pub rejected: u64,
    /// Rows dropped because the booking code was already seen
    pub duplicates: u64,
    /// Duration texts that matched no encoding
    pub parse_failures: u64,
}

/// Recognized encodings across both legs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FormatCounts {
    pub clock: u64,
    pub day_clock: u64,
    pub verbose: u64,
}

/// Batch counters, owned by a single batch run
#[derive(Debug, Clone, Default)]
pub struct BatchMetrics {
    a_to_b: StageCounts,
    b_to_c: StageCounts,
    formats: FormatCounts,
    joined: u64,
    a_to_b_only: u64,
    b_to_c_only: u64,
    precomputed_fallbacks: u64,
}

impl BatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn stage_mut(&mut self, stage: Stage) -> &mut StageCounts {
        match stage {
            Stage::AToB => &mut self.a_to_b,
            Stage::BToC => &mut self.b_to_c,
        }
    }

    pub fn stage(&self, stage: Stage) -> StageCounts {
        match stage {
            Stage::AToB => self.a_to_b,
            Stage::BToC => self.b_to_c,
        }
    }

    /// Record rows loaded from an extract
    pub fn record_rows_loaded(&mut self, stage: Stage, rows: u64, rejected: u64) {
        let counts = self.stage_mut(stage);
        counts.rows += rows;
        counts.rejected += rejected;
    }

    /// Record a duplicate booking code dropped from an extract
    pub fn record_duplicate(&mut self, stage: Stage) {
        self.stage_mut(stage).duplicates += 1;
    }

    /// Record the outcome of parsing one duration text
    pub fn record_parse(&mut self, stage: Stage, result: &Result<ParsedDuration, DurationParseError>) {
        match result {
            Ok(parsed) => match parsed.format {
                DurationFormat::Clock => self.formats.clock += 1,
                DurationFormat::DayClock => self.formats.day_clock += 1,
                DurationFormat::Verbose => self.formats.verbose += 1,
            },
            Err(_) => self.stage_mut(stage).parse_failures += 1,
        }
    }

    /// Record an A->B leg taken from the precomputed seconds column
    pub fn record_precomputed_fallback(&mut self) {
        self.precomputed_fallbacks += 1;
    }

    /// Record join cardinalities
    pub fn record_join(&mut self, joined: u64, a_to_b_only: u64, b_to_c_only: u64) {
        self.joined = joined;
        self.a_to_b_only = a_to_b_only;
        self.b_to_c_only = b_to_c_only;
    }

    pub fn formats(&self) -> FormatCounts {
        self.formats
    }

    /// Build the end-of-run summary from the classified batch
    pub fn summarize(
        &self,
        classified: &[ClassifiedRecord],
        threshold_secs: u64,
        site_id: &str,
    ) -> BatchSummary {
        let mut totals: Vec<f64> =
            classified.iter().filter_map(|c| c.record.total.seconds()).collect();
        totals.sort_by(|a, b| a.total_cmp(b));

        let mut buckets = [0u64; NUM_BUCKETS];
        for &secs in &totals {
            buckets[bucket_index(secs.round_ties_even() as u64)] += 1;
        }

        let measured = totals.len() as u64;
        let mean_total_secs =
            if measured > 0 { Some(totals.iter().sum::<f64>() / measured as f64) } else { None };

        let category_counts: Vec<CategoryCount> = BreachCategory::all()
            .map(|category| CategoryCount {
                category,
                count: classified.iter().filter(|c| c.category == category).count() as u64,
            })
            .collect();

        let breach_count = classified.iter().filter(|c| c.category.is_breach()).count() as u64;
        let missing_data =
            classified.iter().filter(|c| c.category == BreachCategory::MissingData).count() as u64;
        let breach_rate_pct =
            if measured > 0 { Some(breach_count as f64 / measured as f64 * 100.0) } else { None };

        let latency_histogram = buckets
            .iter()
            .enumerate()
            .map(|(i, &count)| HistogramBucket { le_secs: BUCKET_BOUNDS_SECS.get(i).copied(), count })
            .collect();

        BatchSummary {
            batch_id: Uuid::now_v7().to_string(),
            site_id: site_id.to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            threshold_secs,
            a_to_b: self.a_to_b,
            b_to_c: self.b_to_c,
            formats: self.formats,
            precomputed_fallbacks: self.precomputed_fallbacks,
            joined: self.joined,
            a_to_b_only: self.a_to_b_only,
            b_to_c_only: self.b_to_c_only,
            total_bookings: classified.len() as u64,
            measured_bookings: measured,
            missing_data,
            mean_total_secs,
            p50_total_secs: percentile_nearest_rank(&totals, 50),
            p90_total_secs: percentile_nearest_rank(&totals, 90),
            p99_total_secs: percentile_nearest_rank(&totals, 99),
            max_total_secs: totals.last().copied(),
            breach_count,
            breach_rate_pct,
            category_counts,
            latency_histogram,
        }
    }
}

/// Count of report rows carrying one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: BreachCategory,
    pub count: u64,
}

/// One histogram bucket; `le_secs` is `None` for the overflow bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub le_secs: Option<u64>,
    pub count: u64,
}

/// End-of-run batch summary
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// UUIDv7 (time-sortable) identifying this run
    pub batch_id: String,
    pub site_id: String,
    /// RFC 3339 UTC
    pub generated_at: String,
    pub threshold_secs: u64,
    pub a_to_b: StageCounts,
    pub b_to_c: StageCounts,
    pub formats: FormatCounts,
    pub precomputed_fallbacks: u64,
    /// Bookings present in both extracts
    pub joined: u64,
    /// Bookings dropped by the inner join
    pub a_to_b_only: u64,
    pub b_to_c_only: u64,
    /// Report rows
    pub total_bookings: u64,
    /// Report rows with a parseable total
    pub measured_bookings: u64,
    pub missing_data: u64,
    pub mean_total_secs: Option<f64>,
    pub p50_total_secs: Option<f64>,
    pub p90_total_secs: Option<f64>,
    pub p99_total_secs: Option<f64>,
    pub max_total_secs: Option<f64>,
    /// Bookings above the threshold
    pub breach_count: u64,
    /// Breaches as a percentage of measured bookings
    pub breach_rate_pct: Option<f64>,
    pub category_counts: Vec<CategoryCount>,
    pub latency_histogram: Vec<HistogramBucket>,
}

impl BatchSummary {
    pub fn log(&self) {
        info!(
            batch_id = %self.batch_id,
            site_id = %self.site_id,
            threshold_secs = %self.threshold_secs,
            a_to_b_rows = %self.a_to_b.rows,
            b_to_c_rows = %self.b_to_c.rows,
            joined = %self.joined,
            a_to_b_only = %self.a_to_b_only,
            b_to_c_only = %self.b_to_c_only,
            parse_failures = %(self.a_to_b.parse_failures + self.b_to_c.parse_failures),
            missing_data = %self.missing_data,
            mean_total_secs = ?self.mean_total_secs.map(|s| format!("{s:.1}")),
            p90_total_secs = ?self.p90_total_secs.map(|s| format!("{s:.1}")),
            breach_count = %self.breach_count,
            breach_rate_pct = ?self.breach_rate_pct.map(|p| format!("{p:.2}")),
            "batch_summary"
        );
    }
}
