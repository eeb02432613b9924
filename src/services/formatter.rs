//! Report formatting: classified records to flat display rows

use crate::domain::duration::render_duration;
use crate::domain::record::{ClassifiedRecord, ReportRow};

/// Render every classified record, preserving order
pub fn format_report(classified: Vec<ClassifiedRecord>) -> Vec<ReportRow> {
    classified.into_iter().map(format_row).collect()
}

/// Render one classified record
pub fn format_row(classified: ClassifiedRecord) -> ReportRow {
    let ClassifiedRecord { record, category, .. } = classified;

    ReportRow {
        booking_received_at: display_timestamp(record.booking_received_at.as_deref()),
        booking_pushed_at: display_timestamp(record.booking_pushed_at.as_deref()),
        invoice_created_at: display_timestamp(record.invoice_created_at.as_deref()),
        latency_a_to_b: render_duration(record.latency_a_to_b),
        latency_b_to_c: render_duration(record.latency_b_to_c),
        total_latency: render_duration(record.total),
        breach_percentage: category,
        booking_code: record.booking_code,
    }
}

/// Strip trailing fractional seconds from an ISO-like timestamp for display.
///
/// `2025-01-06 10:00:00.123456` becomes `2025-01-06 10:00:00`; any suffix after
/// the fraction (e.g. a UTC offset) is kept. Missing timestamps render empty.
pub fn display_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let bytes = raw.as_bytes();

    for (idx, _) in raw.match_indices('.') {
        // Fraction must follow a `:SS` seconds field
        let after_seconds = idx >= 3
            && bytes[idx - 3] == b':'
            && bytes[idx - 2].is_ascii_digit()
            && bytes[idx - 1].is_ascii_digit();
        if !after_seconds {
            continue;
        }

        let fraction_len = raw[idx + 1..].bytes().take_while(u8::is_ascii_digit).count();
        if fraction_len > 0 {
            return format!("{}{}", &raw[..idx], &raw[idx + 1 + fraction_len..]);
        }
    }

    raw.to_string()
}
