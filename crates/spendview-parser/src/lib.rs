//! Record parser for exported transaction files
//!
//! Decodes semicolon-delimited exports into raw rows and validates each row
//! into a [`Transaction`] or a [`RejectionReason`].

use std::sync::Arc;

pub mod error;
pub mod types;
pub mod parser;
pub mod source;

pub use error::{RejectionReason, SourceError};
pub use parser::{parse_amount, RecordParser, RowParser, MAX_AMOUNT};
pub use source::{expected_header, RowSource};

// Re-export commonly used types
pub use types::{Column, Flow, PeriodKey, RawRow, Transaction};

/// Parser reference type
pub type ParserRef = Arc<dyn RowParser>;
