//! Breach classification against the SLA threshold
//!
//! Two phases over the whole batch:
//! 1. Partition: totals at or below the threshold are within threshold, totals
//!    above it are collected into the exceeding subset, unparseable totals are
//!    missing data and excluded from both.
//! 2. Rank and bin: each exceeding record gets its percentile rank within the
//!    materialized exceeding subset (fraction of the subset at or below its
//!    total, ties share the same rank) and is banded by that rank.
//!
//! Labels are batch-relative: the same booking can land in a different band
//! when the batch composition changes.

use crate::domain::breach::{BreachCategory, PercentileBand};
use crate::domain::duration::CanonicalDuration;
use crate::domain::record::{ClassifiedRecord, JoinedRecord};
use tracing::{debug, info};

/// Sorted totals of every record above the threshold
#[derive(Debug, Clone, Default)]
pub struct ExceedingSet {
    sorted: Vec<f64>,
}

impl ExceedingSet {
    /// Phase 1: materialize the exceeding subset of a batch
    pub fn collect(records: &[JoinedRecord], threshold_secs: f64) -> Self {
        let mut sorted: Vec<f64> = records
            .iter()
            .filter_map(|r| r.total.seconds())
            .filter(|&secs| secs > threshold_secs)
            .collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Self { sorted }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Number of subset members at or below `secs`
    #[inline]
    fn at_or_below(&self, secs: f64) -> usize {
        self.sorted.partition_point(|&v| v <= secs)
    }

    /// Fraction of the subset at or below `secs` (0 for an empty subset)
    pub fn percentile_rank(&self, secs: f64) -> f64 {
        if self.sorted.is_empty() {
            return 0.0;
        }
        self.at_or_below(secs) as f64 / self.sorted.len() as f64
    }

    /// Band for a total from this subset
    pub fn band(&self, secs: f64) -> PercentileBand {
        PercentileBand::from_rank_counts(self.at_or_below(secs), self.sorted.len())
    }
}

/// Classifies a full batch of joined records
#[derive(Debug, Clone, Copy)]
pub struct BreachClassifier {
    threshold_secs: u64,
}

impl BreachClassifier {
    pub fn new(threshold_secs: u64) -> Self {
        Self { threshold_secs }
    }

    pub fn threshold_secs(&self) -> u64 {
        self.threshold_secs
    }

    /// Whether a parseable total breaches the threshold
    #[inline]
    pub fn exceeds(&self, total_secs: f64) -> bool {
        total_secs > self.threshold_secs as f64
    }

    /// Classify a whole batch; output order matches input order
    pub fn classify(&self, records: Vec<JoinedRecord>) -> Vec<ClassifiedRecord> {
        let exceeding = ExceedingSet::collect(&records, self.threshold_secs as f64);
        if exceeding.is_empty() {
            debug!(threshold_secs = self.threshold_secs, "exceeding_set_empty");
        }

        let classified: Vec<ClassifiedRecord> = records
            .into_iter()
            .map(|record| self.classify_one(record, &exceeding))
            .collect();

        let within =
            classified.iter().filter(|c| c.category == BreachCategory::WithinThreshold).count();
        let missing =
            classified.iter().filter(|c| c.category == BreachCategory::MissingData).count();
        info!(
            threshold_secs = self.threshold_secs,
            within,
            exceeding = exceeding.len(),
            missing,
            "classification_completed"
        );

        classified
    }

    /// Phase 2 for one record, against the already materialized subset
    fn classify_one(&self, record: JoinedRecord, exceeding: &ExceedingSet) -> ClassifiedRecord {
        let (category, exceeding_rank) = match record.total {
            CanonicalDuration::Unparseable => (BreachCategory::MissingData, None),
            CanonicalDuration::Seconds(secs) if !self.exceeds(secs) => {
                (BreachCategory::WithinThreshold, None)
            }
            CanonicalDuration::Seconds(secs) => (
                BreachCategory::Exceeding(exceeding.band(secs)),
                Some(exceeding.percentile_rank(secs)),
            ),
        };

        ClassifiedRecord { record, category, exceeding_rank }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::BookingCode;

    fn joined(code: &str, total_secs: f64) -> JoinedRecord {
        JoinedRecord::new(
            BookingCode::from(code),
            CanonicalDuration::Seconds(0.0),
            CanonicalDuration::Seconds(total_secs),
        )
    }

    fn unparseable(code: &str) -> JoinedRecord {
        JoinedRecord::new(
            BookingCode::from(code),
            CanonicalDuration::Seconds(0.0),
            CanonicalDuration::Unparseable,
        )
    }

    fn labels(classified: &[ClassifiedRecord]) -> Vec<&'static str> {
        classified.iter().map(|c| c.category.as_str()).collect()
    }

    #[test]
    fn test_threshold_boundary() {
        let classifier = BreachClassifier::new(1800);
        let classified = classifier.classify(vec![joined("AT", 1800.0), joined("ABOVE", 1800.5)]);

        assert_eq!(classified[0].category, BreachCategory::WithinThreshold);
        assert!(classified[1].category.is_breach());
        assert_eq!(classified[0].exceeding_rank, None);
    }

    #[test]
    fn test_percentile_bands_example() {
        let classifier = BreachClassifier::new(1800);
        let classified = classifier.classify(vec![
            joined("A", 1801.0),
            joined("B", 3600.0),
            joined("C", 5400.0),
            joined("D", 7200.0),
        ]);

        let ranks: Vec<f64> = classified.iter().filter_map(|c| c.exceeding_rank).collect();
        assert_eq!(ranks, vec![0.25, 0.5, 0.75, 1.0]);
        assert_eq!(
            labels(&classified),
            vec![
                "<=50th percentile",
                "<=50th percentile",
                "70-80th percentile",
                "90-100th percentile"
            ]
        );
    }

    #[test]
    fn test_rank_only_within_exceeding_subset() {
        // Within-threshold records must not dilute the exceeding ranks
        let classifier = BreachClassifier::new(1800);
        let mut batch: Vec<JoinedRecord> =
            (0..50).map(|i| joined(&format!("OK{i}"), 60.0 + i as f64)).collect();
        batch.push(joined("SLOW", 4000.0));

        let classified = classifier.classify(batch);
        let slow = classified.last().unwrap();
        assert_eq!(slow.exceeding_rank, Some(1.0));
        assert_eq!(slow.category, BreachCategory::Exceeding(PercentileBand::P90To100));
    }

    #[test]
    fn test_ties_share_rank() {
        let classifier = BreachClassifier::new(1800);
        let classified = classifier.classify(vec![
            joined("A", 2000.0),
            joined("B", 2000.0),
            joined("C", 2000.0),
            joined("D", 9000.0),
        ]);

        assert_eq!(classified[0].exceeding_rank, Some(0.75));
        assert_eq!(classified[1].exceeding_rank, Some(0.75));
        assert_eq!(classified[2].exceeding_rank, Some(0.75));
        assert_eq!(classified[0].category, classified[2].category);
    }

    #[test]
    fn test_single_exceeding_record() {
        let classifier = BreachClassifier::new(1800);
        let classified = classifier.classify(vec![joined("A", 100.0), joined("B", 5000.0)]);

        assert_eq!(classified[1].exceeding_rank, Some(1.0));
        assert_eq!(classified[1].category, BreachCategory::Exceeding(PercentileBand::P90To100));
    }

    #[test]
    fn test_empty_exceeding_set() {
        let classifier = BreachClassifier::new(1800);
        let classified = classifier.classify(vec![joined("A", 10.0), joined("B", 1800.0)]);

        assert!(classified.iter().all(|c| c.category == BreachCategory::WithinThreshold));
    }

    #[test]
    fn test_empty_batch() {
        assert!(BreachClassifier::new(1800).classify(Vec::new()).is_empty());
    }

    #[test]
    fn test_missing_data_excluded_from_ranking() {
        let classifier = BreachClassifier::new(1800);
        let classified = classifier.classify(vec![
            unparseable("M"),
            joined("A", 1801.0),
            joined("B", 3600.0),
        ]);

        assert_eq!(classified[0].category, BreachCategory::MissingData);
        assert_eq!(classified[0].exceeding_rank, None);
        assert_eq!(classified[1].exceeding_rank, Some(0.5));
        assert_eq!(classified[2].exceeding_rank, Some(1.0));
    }

    #[test]
    fn test_classification_is_batch_relative() {
        let classifier = BreachClassifier::new(1800);

        let small = classifier.classify(vec![joined("X", 3600.0), joined("Y", 1900.0)]);
        assert_eq!(small[0].category, BreachCategory::Exceeding(PercentileBand::P90To100));

        // Same booking, same latency, larger batch of slower breaches
        let large = classifier.classify(vec![
            joined("X", 3600.0),
            joined("Y", 1900.0),
            joined("Z1", 7200.0),
            joined("Z2", 8000.0),
            joined("Z3", 9000.0),
        ]);
        assert_eq!(large[0].exceeding_rank, Some(0.4));
        assert_eq!(large[0].category, BreachCategory::Exceeding(PercentileBand::UpTo50));
    }

    #[test]
    fn test_threshold_is_configurable() {
        let strict = BreachClassifier::new(60).classify(vec![joined("A", 120.0)]);
        let lenient = BreachClassifier::new(600).classify(vec![joined("A", 120.0)]);

        assert!(strict[0].category.is_breach());
        assert_eq!(lenient[0].category, BreachCategory::WithinThreshold);
    }

    #[test]
    fn test_exceeding_set_rank_empty() {
        let set = ExceedingSet::default();
        assert_eq!(set.percentile_rank(5000.0), 0.0);
        assert_eq!(set.band(5000.0), PercentileBand::UpTo50);
    }
}
