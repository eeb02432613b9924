//! Infrastructure - configuration and batch diagnostics
//!
//! This module contains infrastructure concerns:
//! - `config` - Batch configuration (TOML loading, defaults, CLI overrides)
//! - `metrics` - Batch counters and end-of-run summary

pub mod config;
pub mod metrics;

// Re-export commonly used types
pub use config::{Config, OutputFormat};
pub use metrics::{BatchMetrics, BatchSummary};
