//! Configuration loading from aigbench.toml
//!
//! AIGBench configuration can be specified in an `aigbench.toml` file next to
//! the benchmark directories. The configuration is automatically discovered by
//! walking up from the current directory. Command-line flags override it.

use crate::registry::TemplateError;
use aigbench_logs::ParserKind;
use aigbench_report::OutputFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration file name looked up during discovery
pub const CONFIG_FILE: &str = "aigbench.toml";

/// Fatal configuration problems, all detected before any case runs
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid duration: {0}")]
    Duration(String),

    #[error("Timeout must be greater than zero")]
    ZeroTimeout,

    #[error("No such method: {0}")]
    UnknownMethod(String),

    #[error("Method {name} needs `{field}` to be defined")]
    IncompleteMethod { name: String, field: &'static str },

    #[error("Method {name} has an invalid template: {source}")]
    Template { name: String, source: TemplateError },

    #[error("Invalid filter pattern: {0}")]
    Filter(#[from] regex::Error),

    #[error("Cannot list input directory {}: {source}", .path.display())]
    InputDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// AIGBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BenchConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// Per-method overrides and additional methods
    #[serde(default)]
    pub methods: BTreeMap<String, MethodConfig>,
}

/// Runner configuration for case execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Wall-clock limit of a single case (e.g., "90s", "1h")
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Number of cases run concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Filename suffix selecting the cases
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Directory holding the circuit files
    #[serde(default = "default_input_directory")]
    pub input_directory: String,
    /// Directory receiving one log per case
    #[serde(default = "default_log_directory")]
    pub log_directory: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            jobs: default_jobs(),
            suffix: default_suffix(),
            input_directory: default_input_directory(),
            log_directory: default_log_directory(),
        }
    }
}

fn default_timeout() -> String {
    "3600s".to_string()
}
fn default_jobs() -> usize {
    1
}
fn default_suffix() -> String {
    "aig".to_string()
}
fn default_input_directory() -> String {
    "tests/hwmcc/".to_string()
}
fn default_log_directory() -> String {
    "tests/log/".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Result file path
    #[serde(default = "default_result")]
    pub result: String,
    /// Result file format: "csv" or "json"
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            result: default_result(),
            format: OutputFormat::default(),
        }
    }
}

fn default_result() -> String {
    "result.csv".to_string()
}

/// One `[methods.<Name>]` table.
///
/// For a built-in method every field is optional and overrides the built-in
/// value. A new method must provide `template`, `executable` and `parser`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodConfig {
    /// Command script with `{input}`, `{pre}`, `{option}` and `{post}` slots
    #[serde(default)]
    pub template: Option<String>,
    /// Verification tool to launch
    #[serde(default)]
    pub executable: Option<String>,
    /// Log parser applied to successful runs
    #[serde(default)]
    pub parser: Option<ParserKind>,
}

impl BenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Try to discover and load configuration by walking up from current directory.
    ///
    /// A file that exists but cannot be read or parsed is an error rather than
    /// silently falling back to defaults.
    pub fn discover() -> Result<Option<Self>, ConfigError> {
        let Ok(start) = std::env::current_dir() else {
            return Ok(None);
        };
        match Self::find_in(&start) {
            Some(path) => Self::load(path).map(Some),
            None => Ok(None),
        }
    }

    /// First `aigbench.toml` found in `start` or one of its ancestors
    pub fn find_in(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Parse duration string (e.g., "90s", "500ms", "2m", "1h").
    ///
    /// A bare number is read as seconds.
    pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConfigError::Duration("empty duration string".to_string()));
        }

        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| ConfigError::Duration(format!("invalid number '{}'", num_part)))?;
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Duration(format!("invalid number '{}'", num_part)));
        }

        let seconds_per_unit = match unit_part.to_lowercase().as_str() {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" | "" => 1.0,
            "m" | "min" => 60.0,
            "h" => 3600.0,
            _ => {
                return Err(ConfigError::Duration(format!(
                    "unknown unit '{}'",
                    unit_part
                )));
            }
        };

        Duration::try_from_secs_f64(value * seconds_per_unit)
            .map_err(|e| ConfigError::Duration(format!("'{}' out of range: {}", s, e)))
    }
}
