/*!
 * Configuration types for seqsplit
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SplitError};

/// Main configuration for a split run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Number of output files to produce
    #[serde(default = "default_num_chunks")]
    pub num_chunks: usize,

    /// Element-name substrings; any line containing one is dropped
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Load additional exclusions from a file (one per line)
    #[serde(default)]
    pub exclude_from: Option<PathBuf>,

    /// Destination directory for chunk files
    #[serde(default = "default_outdir")]
    pub outdir: PathBuf,

    /// Substring that marks the opening line of an entry
    #[serde(default = "default_entry_marker")]
    pub entry_marker: String,

    /// File name prefix; output is `<prefix><index>.xml`
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// Worker pool size (0 = available hardware parallelism)
    #[serde(default)]
    pub workers: usize,

    /// Show a progress bar over chunks
    #[serde(default)]
    pub show_progress: bool,

    /// Compute the plan only, write nothing
    #[serde(default)]
    pub dry_run: bool,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            num_chunks: default_num_chunks(),
            exclude: default_exclude(),
            exclude_from: None,
            outdir: default_outdir(),
            entry_marker: default_entry_marker(),
            output_prefix: default_output_prefix(),
            workers: 0,
            show_progress: false,
            dry_run: false,
            log_level: LogLevel::Info,
            log_file: None,
            verbose: false,
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions for serde
fn default_num_chunks() -> usize {
    100
}

fn default_exclude() -> Vec<String> {
    vec!["sequence".to_string()]
}

fn default_outdir() -> PathBuf {
    PathBuf::from("./")
}

fn default_entry_marker() -> String {
    "<entry".to_string()
}

fn default_output_prefix() -> String {
    "cut_res_".to_string()
}

impl SplitConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SplitError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            SplitError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Reject settings that would produce empty or corrupt output
    pub fn validate(&self) -> Result<()> {
        if self.num_chunks == 0 {
            return Err(SplitError::Config(
                "num_chunks must be at least 1".to_string(),
            ));
        }
        if self.entry_marker.is_empty() {
            return Err(SplitError::Config(
                "entry_marker must not be empty".to_string(),
            ));
        }
        if self.exclude.iter().any(|s| s.is_empty()) {
            return Err(SplitError::Config(
                "exclusion strings must not be empty".to_string(),
            ));
        }
        if self.output_prefix.contains(['/', '\\']) {
            return Err(SplitError::Config(format!(
                "output_prefix '{}' must not contain path separators",
                self.output_prefix
            )));
        }
        Ok(())
    }

    /// Resolved worker pool size
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            get_cpu_count()
        } else {
            self.workers
        }
    }
}

/// Get the number of available CPU cores
fn get_cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
