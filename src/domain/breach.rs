//! Breach category labels
//!
//! Exceeding records are banded by their percentile rank within the exceeding
//! subset of the same batch, so a label is only meaningful relative to the
//! batch it was computed in.

use serde::{Serialize, Serializer};

/// Upper edges of the percentile bands, in tenths of the exceeding subset
const BAND_UPPER_TENTHS: [u64; 6] = [5, 6, 7, 8, 9, 10];

/// Percentile band of an exceeding record, ordered low to high
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PercentileBand {
    UpTo50,
    P50To60,
    P60To70,
    P70To80,
    P80To90,
    P90To100,
}

impl PercentileBand {
    pub const ALL: [PercentileBand; 6] = [
        PercentileBand::UpTo50,
        PercentileBand::P50To60,
        PercentileBand::P60To70,
        PercentileBand::P70To80,
        PercentileBand::P80To90,
        PercentileBand::P90To100,
    ];

    /// Band for a rank of `at_or_below / subset_len`.
    ///
    /// Intervals are half-open on the left: `(0, 0.5]`, `(0.5, 0.6]`, ... `(0.9, 1.0]`.
    /// A rank of 0 falls in the first band. Compared in integer arithmetic so
    /// ranks landing exactly on an edge are never misplaced by float error.
    pub fn from_rank_counts(at_or_below: usize, subset_len: usize) -> Self {
        let at_or_below = at_or_below as u64 * 10;
        let subset_len = subset_len as u64;

        BAND_UPPER_TENTHS
            .iter()
            .position(|&edge| at_or_below <= edge * subset_len)
            .map_or(PercentileBand::P90To100, |idx| Self::ALL[idx])
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PercentileBand::UpTo50 => "<=50th percentile",
            PercentileBand::P50To60 => "50-60th percentile",
            PercentileBand::P60To70 => "60-70th percentile",
            PercentileBand::P70To80 => "70-80th percentile",
            PercentileBand::P80To90 => "80-90th percentile",
            PercentileBand::P90To100 => "90-100th percentile",
        }
    }
}

/// Final category carried in the report's `breach_percentage` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BreachCategory {
    WithinThreshold,
    Exceeding(PercentileBand),
    /// Total latency could not be computed; kept visible, excluded from statistics
    MissingData,
}

impl BreachCategory {
    /// Every label in display order
    pub fn all() -> impl Iterator<Item = BreachCategory> {
        std::iter::once(BreachCategory::WithinThreshold)
            .chain(PercentileBand::ALL.into_iter().map(BreachCategory::Exceeding))
            .chain(std::iter::once(BreachCategory::MissingData))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BreachCategory::WithinThreshold => "Within Threshold",
            BreachCategory::Exceeding(band) => band.as_str(),
            BreachCategory::MissingData => "Missing Data",
        }
    }

    #[inline]
    pub fn is_breach(&self) -> bool {
        matches!(self, BreachCategory::Exceeding(_))
    }
}

impl std::fmt::Display for BreachCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BreachCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
