//! Services - batch business logic
//!
//! - `aggregator` - inner join of the two stage extracts and leg parsing
//! - `classifier` - SLA breach classification with percentile bands
//! - `formatter` - classified records to display rows
//! - `pipeline` - the batch job wiring load, join, classify, format and write

pub mod aggregator;
pub mod classifier;
pub mod formatter;
pub mod pipeline;

// Re-export commonly used types
pub use aggregator::join_stages;
pub use classifier::{BreachClassifier, ExceedingSet};
pub use formatter::{display_timestamp, format_report};
pub use pipeline::{BatchJob, BatchOutcome};
