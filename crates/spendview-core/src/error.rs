//! Error types for spendview-core
//!
//! Row-level problems never surface here: they are collected as rejections in
//! the report data. These errors cover the few conditions that stop a whole
//! assembly before it starts, such as an export without the expected header.

use serde::{Deserialize, Serialize};
use spendview_config::ConfigError;
use spendview_parser::SourceError;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A source could not be decoded into rows
    InvalidSource,
    /// Configuration error
    ConfigError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::InvalidSource => write!(f, "INVALID_SOURCE"),
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
        }
    }
}

/// Detailed error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    /// Source identifier (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            source: None,
            suggestions: vec![],
        }
    }

    pub fn with_source(mut self, source: String) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        if let Some(ref source) = self.source {
            write!(f, "\nSource: {}", source)?;
        }
        Ok(())
    }
}

/// Main error type for spendview-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Source {source_id} is unusable: {error}")]
    Source {
        source_id: String,
        #[source]
        error: SourceError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Source { .. } => ErrorCode::InvalidSource,
            CoreError::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::Source { source_id, error } => {
                details = details.with_source(source_id.clone());
                match error {
                    SourceError::MissingHeader | SourceError::HeaderMismatch { .. } => {
                        details = details.with_suggestion(format!(
                            "The first row must be: {}",
                            spendview_parser::expected_header().join(";")
                        ));
                    }
                    SourceError::Malformed { .. } => {
                        details = details.with_suggestion(
                            "Check the quoting of the reported line.".to_string()
                        );
                    }
                }
            }
            CoreError::Config(error) => {
                details.suggestions.extend(error.to_details().suggestions);
            }
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

// ==================== Tests ====================
