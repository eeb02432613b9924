//! Shared types for the latency batch: booking identifiers and stage extract rows

use serde::{Deserialize, Serialize};

/// Newtype wrapper for booking codes to provide type safety
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingCode(pub String);

impl BookingCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookingCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

/// Lifecycle transition a stage extract describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Booking received -> booking pushed
    AToB,
    /// Booking pushed -> invoice created
    BToC,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::AToB => "a_to_b",
            Stage::BToC => "b_to_c",
        }
    }
}

/// One row of the "booking received -> booking pushed" extract
///
/// Column names vary between extract revisions, so the duration columns
/// accept their historical aliases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AbRecord {
    pub booking_code: BookingCode,
    #[serde(default)]
    pub booking_received_at: Option<String>,
    #[serde(default)]
    pub booking_pushed_at: Option<String>,
    /// Raw duration text (clock form in practice)
    #[serde(default, alias = "latency_a_to_b_str", alias = "latency_a_to_b")]
    pub latency_interval: Option<String>,
    /// Precomputed seconds, used only when the text does not parse
    #[serde(
        default,
        alias = "latency_a_to_b_sec",
        deserialize_with = "csv::invalid_option"
    )]
    pub latency_in_seconds: Option<f64>,
}

/// One row of the "booking pushed -> invoice created" extract
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BcRecord {
    #[serde(alias = "extracted_code")]
    pub booking_code: BookingCode,
    #[serde(default)]
    pub invoice_created_at: Option<String>,
    /// Raw duration text in any of the recognized encodings
    #[serde(default, alias = "latency_b_to_c_str")]
    pub latency_b_to_c: Option<String>,
}

impl AbRecord {
    pub fn new(booking_code: &str, latency_interval: &str) -> Self {
        Self {
            booking_code: BookingCode::from(booking_code),
            latency_interval: Some(latency_interval.to_string()),
            ..Self::default()
        }
    }

    pub fn with_timestamps(mut self, received_at: &str, pushed_at: &str) -> Self {
        self.booking_received_at = Some(received_at.to_string());
        self.booking_pushed_at = Some(pushed_at.to_string());
        self
    }

    pub fn with_precomputed_seconds(mut self, seconds: f64) -> Self {
        self.latency_in_seconds = Some(seconds);
        self
    }
}

impl BcRecord {
    pub fn new(booking_code: &str, latency_b_to_c: &str) -> Self {
        Self {
            booking_code: BookingCode::from(booking_code),
            latency_b_to_c: Some(latency_b_to_c.to_string()),
            ..Self::default()
        }
    }

    pub fn with_invoice_created_at(mut self, invoice_created_at: &str) -> Self {
        self.invoice_created_at = Some(invoice_created_at.to_string());
        self
    }
}
