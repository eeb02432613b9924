//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/dev.toml
//!
//! The resolved `Config` is passed explicitly into the batch job; CLI flags
//! override individual values through the `with_*` builders.

use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Report output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Jsonl,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Jsonl => "jsonl",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// A->B extract (booking received -> booking pushed)
    #[serde(default = "default_ab_file")]
    pub ab_file: String,
    /// B->C extract (booking pushed -> invoice created)
    #[serde(default = "default_bc_file")]
    pub bc_file: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { ab_file: default_ab_file(), bc_file: default_bc_file() }
    }
}

fn default_ab_file() -> String {
    "ab_latency.csv".to_string()
}

fn default_bc_file() -> String {
    "bc_latency.csv".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_file")]
    pub file: String,
    #[serde(default = "default_output_format")]
    pub format: OutputFormat,
    /// Batch summary JSON (omit to only log the summary)
    #[serde(default)]
    pub summary_file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { file: default_output_file(), format: default_output_format(), summary_file: None }
    }
}

fn default_output_file() -> String {
    "final_latency.csv".to_string()
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Csv
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlaConfig {
    /// Total latency above this is a breach
    #[serde(default = "default_threshold_secs")]
    pub threshold_secs: u64,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self { threshold_secs: default_threshold_secs() }
    }
}

fn default_threshold_secs() -> u64 {
    1800 // 30 minute SLA
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_id")]
    pub id: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self { id: default_site_id() }
    }
}

fn default_site_id() -> String {
    "booking-latency".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub sla: SlaConfig,
}

/// Batch configuration
#[derive(Debug, Clone)]
pub struct Config {
    site_id: String,
    ab_file: String,
    bc_file: String,
    output_file: String,
    output_format: OutputFormat,
    summary_file: Option<String>,
    threshold_secs: u64,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default")
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: &str) -> Self {
        Self {
            site_id: toml_config.site.id,
            ab_file: toml_config.input.ab_file,
            bc_file: toml_config.input.bc_file,
            output_file: toml_config.output.file,
            output_format: toml_config.output.format,
            summary_file: toml_config.output.summary_file,
            threshold_secs: toml_config.sla.threshold_secs,
            config_file: config_file.to_string(),
        }
    }

    /// Determine config file path from the CLI flag or environment
    pub fn resolve_config_path(cli_path: Option<&str>) -> String {
        if let Some(path) = cli_path {
            return path.to_string();
        }

        if let Ok(path) = env::var("CONFIG_FILE") {
            return path;
        }

        "config/dev.toml".to_string()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self::from_toml(toml_config, &path.display().to_string()))
    }

    /// Load configuration - tries TOML file first, falls back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "config_load_failed_using_defaults");
                Self::default()
            }
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    pub fn ab_file(&self) -> &str {
        &self.ab_file
    }

    pub fn bc_file(&self) -> &str {
        &self.bc_file
    }

    pub fn output_file(&self) -> &str {
        &self.output_file
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn summary_file(&self) -> Option<&str> {
        self.summary_file.as_deref()
    }

    pub fn threshold_secs(&self) -> u64 {
        self.threshold_secs
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    pub fn with_ab_file(mut self, path: impl Into<String>) -> Self {
        self.ab_file = path.into();
        self
    }

    pub fn with_bc_file(mut self, path: impl Into<String>) -> Self {
        self.bc_file = path.into();
        self
    }

    pub fn with_output_file(mut self, path: impl Into<String>) -> Self {
        self.output_file = path.into();
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_summary_file(mut self, path: impl Into<String>) -> Self {
        self.summary_file = Some(path.into());
        self
    }

    pub fn with_threshold_secs(mut self, secs: u64) -> Self {
        self.threshold_secs = secs;
        self
    }
}
