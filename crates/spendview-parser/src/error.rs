//! Error types for spendview-parser

use serde::Serialize;
use thiserror::Error;

/// Why a single row did not become a transaction.
///
/// Row rejections are data, not failures: they are collected next to the
/// accepted transactions and never stop the rows that follow.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    #[error("Invalid date: {value:?}")]
    InvalidDate { value: String },

    #[error("Invalid amount: {value:?}")]
    InvalidAmount { value: String },

    #[error("Missing category")]
    MissingCategory,
}

impl RejectionReason {
    /// Stable code used in logs and in the serialized report
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::InvalidDate { .. } => "INVALID_DATE",
            RejectionReason::InvalidAmount { .. } => "INVALID_AMOUNT",
            RejectionReason::MissingCategory => "MISSING_CATEGORY",
        }
    }
}

/// A whole source could not be decoded into rows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Missing header row")]
    MissingHeader,

    #[error("Header mismatch: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Malformed record at line {line}: {message}")]
    Malformed { line: u64, message: String },
}
