//! Batch job: extracts in, classified latency report out
//!
//! Control flow: load both extracts -> parse and join -> classify -> format ->
//! write. The batch either completes (possibly with rows marked missing data)
//! or fails as a whole when an extract cannot be loaded, the report cannot be
//! written, or the extracts share no booking code at all.

use crate::domain::record::ReportRow;
use crate::domain::types::{AbRecord, BcRecord, Stage};
use crate::infra::config::Config;
use crate::infra::metrics::{BatchMetrics, BatchSummary};
use crate::io::egress::{write_summary, ReportEgress};
use crate::io::source::{read_stage_file, StageExtract};
use crate::services::aggregator::join_stages;
use crate::services::classifier::BreachClassifier;
use crate::services::formatter::format_report;
use anyhow::ensure;
use tracing::info;

/// Result of one batch
#[derive(Debug)]
pub struct BatchOutcome {
    pub rows: Vec<ReportRow>,
    pub summary: BatchSummary,
}

/// One latency batch over a fixed configuration
pub struct BatchJob {
    config: Config,
}

impl BatchJob {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load both extracts from disk, process them and write the outputs
    pub fn run(&self) -> anyhow::Result<BatchOutcome> {
        info!(
            ab_file = %self.config.ab_file(),
            bc_file = %self.config.bc_file(),
            threshold_secs = self.config.threshold_secs(),
            "batch_started"
        );

        let ab = read_stage_file::<AbRecord>(self.config.ab_file())?;
        let bc = read_stage_file::<BcRecord>(self.config.bc_file())?;

        let outcome = self.process(ab, bc)?;

        ReportEgress::new(self.config.output_file(), self.config.output_format())
            .write_report(&outcome.rows)?;
        if let Some(summary_file) = self.config.summary_file() {
            write_summary(summary_file, &outcome.summary)?;
        }

        outcome.summary.log();
        Ok(outcome)
    }

    /// Run the in-memory part of the batch over already loaded extracts
    pub fn process(
        &self,
        ab: StageExtract<AbRecord>,
        bc: StageExtract<BcRecord>,
    ) -> anyhow::Result<BatchOutcome> {
        let mut metrics = BatchMetrics::new();
        metrics.record_rows_loaded(Stage::AToB, ab.records.len() as u64, ab.rejected);
        metrics.record_rows_loaded(Stage::BToC, bc.records.len() as u64, bc.rejected);

        let (ab_rows, bc_rows) = (ab.records.len(), bc.records.len());
        let joined = join_stages(ab.records, bc.records, &mut metrics);
        ensure!(
            !joined.is_empty(),
            "extracts share no booking codes ({ab_rows} a_to_b rows, {bc_rows} b_to_c rows)"
        );

        let threshold_secs = self.config.threshold_secs();
        let classified = BreachClassifier::new(threshold_secs).classify(joined);
        let summary = metrics.summarize(&classified, threshold_secs, self.config.site_id());
        let rows = format_report(classified);

        Ok(BatchOutcome { rows, summary })
    }
}
