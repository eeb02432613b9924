//! Booking latency - SLA breach report over two stage extracts
//!
//! Joins the A->B (booking received -> pushed) and B->C (pushed -> invoice
//! created) extracts by booking code, sums the two legs and labels each
//! booking against the SLA threshold.
//!
//! Module structure:
//! - `domain/` - Core types (booking codes, durations, breach categories)
//! - `io/` - Extract loading and report egress
//! - `services/` - Join, classification, formatting and the batch job
//! - `infra/` - Infrastructure (Config, Metrics)

use booking_latency::infra::{Config, OutputFormat};
use booking_latency::services::BatchJob;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Booking latency - classify end-to-end booking latency against the SLA
#[derive(Parser, Debug)]
#[command(name = "booking-latency", version, about)]
struct Args {
    /// Path to TOML configuration file (falls back to CONFIG_FILE, then config/dev.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// A->B extract CSV
    #[arg(long)]
    ab: Option<String>,

    /// B->C extract CSV
    #[arg(long)]
    bc: Option<String>,

    /// Report output file
    #[arg(short, long)]
    output: Option<String>,

    /// Report output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// SLA threshold in seconds
    #[arg(long)]
    threshold_secs: Option<u64>,

    /// Write the batch summary JSON here
    #[arg(long)]
    summary: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Default: INFO, use RUST_LOG=debug for per-row visibility
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        "booking_latency_starting"
    );

    let config_path = Config::resolve_config_path(args.config.as_deref());
    let config = apply_overrides(Config::load_from_path(&config_path), &args);

    info!(
        config_file = %config.config_file(),
        site_id = %config.site_id(),
        ab_file = %config.ab_file(),
        bc_file = %config.bc_file(),
        output_file = %config.output_file(),
        output_format = config.output_format().as_str(),
        summary_file = ?config.summary_file(),
        threshold_secs = config.threshold_secs(),
        "config_loaded"
    );

    match BatchJob::new(config).run() {
        Ok(outcome) => {
            info!(
                batch_id = %outcome.summary.batch_id,
                rows = outcome.rows.len(),
                breaches = outcome.summary.breach_count,
                "booking_latency_completed"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "batch_failed");
            Err(e.into())
        }
    }
}

/// CLI flags take precedence over the config file
fn apply_overrides(mut config: Config, args: &Args) -> Config {
    if let Some(path) = &args.ab {
        config = config.with_ab_file(path);
    }
    if let Some(path) = &args.bc {
        config = config.with_bc_file(path);
    }
    if let Some(path) = &args.output {
        config = config.with_output_file(path);
    }
    if let Some(format) = args.format {
        config = config.with_output_format(format);
    }
    if let Some(secs) = args.threshold_secs {
        config = config.with_threshold_secs(secs);
    }
    if let Some(path) = &args.summary {
        config = config.with_summary_file(path);
    }
    config
}
