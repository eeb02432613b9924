//! Latency aggregation: inner join of the two stage extracts by booking code
//!
//! Only bookings present in both extracts are kept; the rest are counted as
//! join misses. Both legs are parsed into canonical seconds and summed. A leg
//! that fails to parse makes the total unparseable, but the booking is still
//! kept so it shows up in the report as missing data.

use crate::domain::duration::{parse_duration, CanonicalDuration};
use crate::domain::record::JoinedRecord;
use crate::domain::types::{AbRecord, BcRecord, BookingCode, Stage};
use crate::infra::metrics::BatchMetrics;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

/// Join the A->B and B->C extracts. Output order follows the A->B extract.
///
/// Booking codes are expected to be unique within each extract; when they are
/// not, the first occurrence wins and the rest are counted as duplicates.
pub fn join_stages(
    ab_records: Vec<AbRecord>,
    bc_records: Vec<BcRecord>,
    metrics: &mut BatchMetrics,
) -> Vec<JoinedRecord> {
    let mut bc_index: FxHashMap<BookingCode, BcRecord> = FxHashMap::default();
    bc_index.reserve(bc_records.len());
    for bc in bc_records {
        if bc_index.contains_key(&bc.booking_code) {
            warn!(booking_code = %bc.booking_code, stage = Stage::BToC.as_str(), "duplicate_booking_code");
            metrics.record_duplicate(Stage::BToC);
            continue;
        }
        bc_index.insert(bc.booking_code.clone(), bc);
    }

    let mut seen: FxHashSet<BookingCode> = FxHashSet::default();
    let mut joined = Vec::with_capacity(ab_records.len().min(bc_index.len()));
    let mut a_to_b_only = 0u64;

    for ab in ab_records {
        if !seen.insert(ab.booking_code.clone()) {
            warn!(booking_code = %ab.booking_code, stage = Stage::AToB.as_str(), "duplicate_booking_code");
            metrics.record_duplicate(Stage::AToB);
            continue;
        }

        match bc_index.remove(&ab.booking_code) {
            Some(bc) => joined.push(join_pair(ab, bc, metrics)),
            None => {
                debug!(booking_code = %ab.booking_code, "join_miss_a_to_b_only");
                a_to_b_only += 1;
            }
        }
    }

    let b_to_c_only = bc_index.len() as u64;
    metrics.record_join(joined.len() as u64, a_to_b_only, b_to_c_only);

    info!(joined = joined.len(), a_to_b_only, b_to_c_only, "join_completed");
    joined
}

fn join_pair(ab: AbRecord, bc: BcRecord, metrics: &mut BatchMetrics) -> JoinedRecord {
    let latency_a_to_b = resolve_a_to_b(&ab, metrics);
    let latency_b_to_c =
        parse_leg(Stage::BToC, &bc.booking_code, bc.latency_b_to_c.as_deref(), metrics);

    JoinedRecord {
        booking_received_at: ab.booking_received_at,
        booking_pushed_at: ab.booking_pushed_at,
        invoice_created_at: bc.invoice_created_at,
        ..JoinedRecord::new(ab.booking_code, latency_a_to_b, latency_b_to_c)
    }
}

/// A->B leg: duration text first, precomputed seconds when the text does not parse
fn resolve_a_to_b(ab: &AbRecord, metrics: &mut BatchMetrics) -> CanonicalDuration {
    let parsed = parse_leg(Stage::AToB, &ab.booking_code, ab.latency_interval.as_deref(), metrics);
    if !parsed.is_unparseable() {
        return parsed;
    }

    match ab.latency_in_seconds.map(CanonicalDuration::from_seconds) {
        Some(precomputed @ CanonicalDuration::Seconds(secs)) => {
            debug!(booking_code = %ab.booking_code, secs, "a_to_b_precomputed_fallback");
            metrics.record_precomputed_fallback();
            precomputed
        }
        _ => CanonicalDuration::Unparseable,
    }
}

/// Parse one leg's duration text, logging the raw text on failure
fn parse_leg(
    stage: Stage,
    booking_code: &BookingCode,
    text: Option<&str>,
    metrics: &mut BatchMetrics,
) -> CanonicalDuration {
    let result = parse_duration(text.unwrap_or_default());
    metrics.record_parse(stage, &result);

    if let Err(e) = &result {
        warn!(
            booking_code = %booking_code,
            stage = stage.as_str(),
            raw = ?e.text(),
            "duration_unparseable"
        );
    }

    CanonicalDuration::from(&result)
}
