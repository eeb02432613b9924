//! Duration text parsing and rendering
//!
//! Upstream extracts encode stage latencies in three incompatible textual forms:
//! - Clock: `H:MM:SS(.ffffff)`, e.g. "0:06:04.304215"
//! - Day-clock: `D day(s), H:MM:SS(.ffffff)`, e.g. "1 day, 2:19:01.113712"
//! - Verbose: `[Y years M mons] D days H hours M mins S secs`,
//!   e.g. "0 years 0 mons 0 days 0 hours 0 mins 12.565 secs"
//!
//! Every form is normalized into canonical seconds (`f64`, unrounded). Rounding
//! only happens in [`render_duration`].
//!
//! Year and month components use a fixed approximation: 1 year = 365 days,
//! 1 month = 30 days. No calendar correction is applied.

use serde::Serialize;
use std::fmt;

pub const SECS_PER_MINUTE: f64 = 60.0;
pub const SECS_PER_HOUR: f64 = 3_600.0;
pub const SECS_PER_DAY: f64 = 86_400.0;
pub const DAYS_PER_YEAR: f64 = 365.0;
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Exclusive upper bound on seconds that can be rendered as whole seconds (2^64)
const MAX_SECONDS: f64 = u64::MAX as f64;

/// Which encoding a duration string was recognized as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationFormat {
    Clock,
    DayClock,
    Verbose,
}

impl DurationFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationFormat::Clock => "clock",
            DurationFormat::DayClock => "day_clock",
            DurationFormat::Verbose => "verbose",
        }
    }
}

/// Successful parse result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedDuration {
    pub seconds: f64,
    pub format: DurationFormat,
}

/// Duration text matched none of the known encodings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationParseError {
    text: String,
}

impl DurationParseError {
    /// Original text, untrimmed
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for DurationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized duration encoding: {:?}", self.text)
    }
}

impl std::error::Error for DurationParseError {}

/// Canonical latency value: non-negative seconds, or an explicit unparseable marker
///
/// The marker is never coerced to zero. Arithmetic over an unparseable value
/// stays unparseable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanonicalDuration {
    Seconds(f64),
    Unparseable,
}

impl CanonicalDuration {
    /// Wrap a seconds value; negative and non-finite values become `Unparseable`
    pub fn from_seconds(seconds: f64) -> Self {
        if seconds.is_finite() && seconds >= 0.0 {
            CanonicalDuration::Seconds(seconds)
        } else {
            CanonicalDuration::Unparseable
        }
    }

    /// Seconds value, or `None` when unparseable
    #[inline]
    pub fn seconds(self) -> Option<f64> {
        match self {
            CanonicalDuration::Seconds(s) => Some(s),
            CanonicalDuration::Unparseable => None,
        }
    }

    #[inline]
    pub fn is_unparseable(self) -> bool {
        matches!(self, CanonicalDuration::Unparseable)
    }

    /// Sum of two legs; unparseable if either leg is
    pub fn combine(self, other: CanonicalDuration) -> CanonicalDuration {
        match (self, other) {
            (CanonicalDuration::Seconds(a), CanonicalDuration::Seconds(b)) => {
                CanonicalDuration::from_seconds(a + b)
            }
            _ => CanonicalDuration::Unparseable,
        }
    }
}

impl From<&Result<ParsedDuration, DurationParseError>> for CanonicalDuration {
    fn from(result: &Result<ParsedDuration, DurationParseError>) -> Self {
        match result {
            Ok(parsed) => CanonicalDuration::from_seconds(parsed.seconds),
            Err(_) => CanonicalDuration::Unparseable,
        }
    }
}

/// One encoding recognizer
struct Matcher {
    format: DurationFormat,
    parse: fn(&str) -> Option<f64>,
}

/// Recognizers in priority order, first match wins
const MATCHERS: [Matcher; 3] = [
    Matcher { format: DurationFormat::Clock, parse: match_clock },
    Matcher { format: DurationFormat::DayClock, parse: match_day_clock },
    Matcher { format: DurationFormat::Verbose, parse: match_verbose },
];

/// Parse a duration string of unknown encoding into canonical seconds.
///
/// Surrounding whitespace is ignored. Field values are not range-checked, so
/// `0:75:00` is accepted as 4500 seconds. A match whose total overflows to
/// infinity or past 2^64 seconds is a parse failure.
///
/// # Example
///
/// ```
/// use booking_latency::domain::duration::{parse_duration, DurationFormat};
///
/// let parsed = parse_duration("1 day, 2:19:01.5").unwrap();
/// assert_eq!(parsed.format, DurationFormat::DayClock);
/// assert!((parsed.seconds - 94741.5).abs() < 1e-9);
///
/// assert!(parse_duration("about an hour").is_err());
/// ```
pub fn parse_duration(text: &str) -> Result<ParsedDuration, DurationParseError> {
    let trimmed = text.trim();

    MATCHERS
        .iter()
        .find_map(|m| {
            (m.parse)(trimmed)
                .filter(|&seconds| seconds.is_finite() && seconds < MAX_SECONDS)
                .map(|seconds| ParsedDuration { seconds, format: m.format })
        })
        .ok_or_else(|| DurationParseError { text: text.to_string() })
}

/// `H:MM:SS(.f)`
fn match_clock(text: &str) -> Option<f64> {
    let mut parts = text.split(':');
    let hours = parse_integer(parts.next()?)?;
    let minutes = parse_integer(parts.next()?)?;
    let seconds = parse_decimal(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * SECS_PER_HOUR + minutes * SECS_PER_MINUTE + seconds)
}

/// `D day(s), H:MM:SS(.f)`
///
/// The comma is optional so rendered report values (`D days HH:MM:SS`) parse back.
fn match_day_clock(text: &str) -> Option<f64> {
    let (days, rest) = text.split_once(char::is_whitespace)?;
    let days = parse_integer(days)?;

    let (unit, clock) = rest.trim_start().split_once(char::is_whitespace)?;
    let unit = unit.strip_suffix(',').unwrap_or(unit);
    if !is_unit(unit, "day") {
        return None;
    }

    let clock = match_clock(clock.trim_start())?;
    Some(days * SECS_PER_DAY + clock)
}

/// Optional leading calendar components of the verbose form
const CALENDAR_UNITS: [(&str, f64); 2] = [("year", DAYS_PER_YEAR), ("mon", DAYS_PER_MONTH)];

/// `[Y year(s) M mon(s)] D day(s) H hour(s) M min(s) S(.f) secs`
fn match_verbose(text: &str) -> Option<f64> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let (calendar, clock) = match tokens.len() {
        8 => tokens.split_at(0),
        12 => tokens.split_at(4),
        _ => return None,
    };

    let mut days = 0.0;
    for (pair, (unit, days_per_unit)) in calendar.chunks(2).zip(CALENDAR_UNITS) {
        if !is_unit(pair[1], unit) {
            return None;
        }
        days += parse_integer(pair[0])? * days_per_unit;
    }

    let &[d, d_unit, h, h_unit, m, m_unit, s, s_unit] = clock else {
        return None;
    };
    if !(is_unit(d_unit, "day")
        && is_unit(h_unit, "hour")
        && is_unit(m_unit, "min")
        && is_unit(s_unit, "sec"))
    {
        return None;
    }

    days += parse_integer(d)?;
    Some(
        days * SECS_PER_DAY
            + parse_integer(h)? * SECS_PER_HOUR
            + parse_integer(m)? * SECS_PER_MINUTE
            + parse_decimal(s)?,
    )
}

/// Singular or plural form of a unit word
#[inline]
fn is_unit(token: &str, singular: &str) -> bool {
    token == singular || token.strip_suffix('s') == Some(singular)
}

/// ASCII digits only (no sign, no exponent)
fn parse_integer(s: &str) -> Option<f64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Digits with an optional `.digits` fraction
fn parse_decimal(s: &str) -> Option<f64> {
    let (whole, fraction) = match s.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (s, None),
    };
    parse_integer(whole)?;
    if let Some(fraction) = fraction {
        parse_integer(fraction)?;
    }
    s.parse().ok()
}

/// Render canonical seconds as `"{days} days {HH}:{MM}:{SS}"`.
///
/// Sub-second precision is rounded to the nearest whole second, ties to even
/// (`364.5` renders as `00:06:04`). Unparseable values, and sums too large for
/// whole seconds, render as the empty string, never as a zero or clamped duration.
pub fn render_duration(duration: CanonicalDuration) -> String {
    match duration.seconds() {
        Some(seconds) if seconds.is_finite() && seconds >= 0.0 => {
            let whole = seconds.round_ties_even();
            if whole < MAX_SECONDS {
                render_whole_seconds(whole as u64)
            } else {
                String::new()
            }
        }
        _ => String::new(),
    }
}

fn render_whole_seconds(total: u64) -> String {
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    format!("{days} days {hours:02}:{minutes:02}:{seconds:02}")
}
