//! Domain models - booking latency types, duration encodings and breach labels
//!
//! This module contains the canonical data types used throughout the batch:
//! - `types` - booking codes and the two stage extract rows
//! - `duration` - duration text parsing and canonical-seconds rendering
//! - `breach` - breach category labels and percentile bands
//! - `record` - joined, classified and report rows

pub mod breach;
pub mod duration;
pub mod record;
pub mod types;

// Re-export commonly used types at module level
pub use breach::{BreachCategory, PercentileBand};
pub use duration::{parse_duration, render_duration, CanonicalDuration, DurationFormat};
pub use record::{ClassifiedRecord, JoinedRecord, ReportRow};
pub use types::{AbRecord, BcRecord, BookingCode, Stage};
