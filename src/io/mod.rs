//! IO modules - file interfaces of the batch
//!
//! - `source` - stage extract loading (CSV)
//! - `egress` - report and batch summary output (CSV / JSONL / JSON)

pub mod egress;
pub mod source;

// Re-export commonly used types
pub use egress::{write_summary, ReportEgress};
pub use source::{read_stage, read_stage_file, StageExtract, StageRow};
