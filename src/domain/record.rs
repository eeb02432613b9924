//! Batch record model: joined, classified and rendered rows

use crate::domain::breach::BreachCategory;
use crate::domain::duration::CanonicalDuration;
use crate::domain::types::BookingCode;
use serde::Serialize;

/// A booking present in both stage extracts, with both legs parsed
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub booking_code: BookingCode,
    pub booking_received_at: Option<String>,
    pub booking_pushed_at: Option<String>,
    pub invoice_created_at: Option<String>,
    pub latency_a_to_b: CanonicalDuration,
    pub latency_b_to_c: CanonicalDuration,
    /// Sum of both legs, unparseable if either leg is
    pub total: CanonicalDuration,
}

impl JoinedRecord {
    /// Build from two parsed legs; the total is derived
    pub fn new(
        booking_code: BookingCode,
        latency_a_to_b: CanonicalDuration,
        latency_b_to_c: CanonicalDuration,
    ) -> Self {
        Self {
            booking_code,
            booking_received_at: None,
            booking_pushed_at: None,
            invoice_created_at: None,
            latency_a_to_b,
            latency_b_to_c,
            total: latency_a_to_b.combine(latency_b_to_c),
        }
    }
}

/// Joined record with its batch-relative breach category
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub record: JoinedRecord,
    pub category: BreachCategory,
    /// Percentile rank within the exceeding subset (`None` unless exceeding)
    pub exceeding_rank: Option<f64>,
}

/// One output row of the final report, columns in output order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub booking_code: BookingCode,
    pub booking_received_at: String,
    pub booking_pushed_at: String,
    pub invoice_created_at: String,
    pub latency_a_to_b: String,
    pub latency_b_to_c: String,
    pub total_latency: String,
    /// Historical column name, carries the breach category label
    pub breach_percentage: BreachCategory,
}

/// Report header in output order
pub const REPORT_COLUMNS: [&str; 8] = [
    "booking_code",
    "booking_received_at",
    "booking_pushed_at",
    "invoice_created_at",
    "latency_a_to_b",
    "latency_b_to_c",
    "total_latency",
    "breach_percentage",
];
