//! Configuration management for spendview
//!
//! This module handles loading, validation, and management of
//! spendview configuration from YAML files. The aggregation rules are
//! fixed; the only behavioural input is the date format of the exports.

pub mod error;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigErrorCode, ConfigResult};

// ==================== Configuration Types ====================

/// Where the exported transaction files live and how to read their dates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory holding the exported files
    #[serde(default = "default_input_path")]
    pub path: PathBuf,
    /// Glob pattern matched inside `path`
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// chrono strftime format of the Date column
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            pattern: default_pattern(),
            date_format: default_date_format(),
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("./input")
}

fn default_pattern() -> String {
    "*.csv".to_string()
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

/// Display-only report settings, copied into the report data untouched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            title: default_title(),
        }
    }
}

fn default_currency_symbol() -> String {
    "€".to_string()
}

fn default_title() -> String {
    "Expenses report".to_string()
}

/// Output location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("./output/report.json")
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Settings handed to the record parser at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserSettings {
    pub date_format: String,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::IoError {
            path: path.to_string_lossy().to_string(),
            source,
        })?;

        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        // An empty document deserializes to unit, not to an empty map
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content)
                .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        validate_date_format(&self.input.date_format)?;

        if self.input.pattern.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "input.pattern".to_string(),
                reason: "Pattern must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Glob expression for the input files
    pub fn input_glob(&self) -> PathBuf {
        self.input.path.join(&self.input.pattern)
    }

    pub fn parser_settings(&self) -> ParserSettings {
        ParserSettings {
            date_format: self.input.date_format.clone(),
        }
    }
}

/// A date format must be understood by chrono and must carry year, month and day.
fn validate_date_format(format: &str) -> ConfigResult<()> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        field: "input.date_format".to_string(),
        reason: reason.to_string(),
    };

    if format.trim().is_empty() {
        return Err(invalid("Date format must not be empty"));
    }

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid("Date format contains an unknown specifier"));
    }

    if let Some(sample) = NaiveDate::from_ymd_opt(2023, 11, 28) {
        let rendered = sample.format(format).to_string();
        if NaiveDate::parse_from_str(&rendered, format).ok() != Some(sample) {
            return Err(invalid("Date format must include year, month and day"));
        }
    }

    Ok(())
}
