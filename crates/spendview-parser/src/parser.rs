//! Record parser: one raw row in, one validated transaction or a rejection out

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use spendview_config::ParserSettings;
use std::str::FromStr;

use crate::error::RejectionReason;
use crate::types::{Column, RawRow, Transaction};

/// Sign, digits, and `.`/`,` separated digit groups, or a bare fraction such as
/// `-.50`; spaces and apostrophes are removed before matching.
static AMOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:[.,]\d+)*|[.,]\d+)$").expect("amount pattern is valid")
});

/// Largest accepted absolute amount (10^15). Keeps lifetime sums far from the
/// `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Trait for row parsers
pub trait RowParser: Send + Sync {
    /// Turn one raw row into a transaction. Pure; never touches other rows.
    fn parse(&self, row: &RawRow) -> Result<Transaction, RejectionReason>;
}

/// Default parser for the semicolon exports
#[derive(Debug, Clone, Default)]
pub struct RecordParser {
    settings: ParserSettings,
}

impl RecordParser {
    pub fn new(settings: ParserSettings) -> Self {
        Self { settings }
    }

    fn parse_date(&self, raw: &str) -> Result<NaiveDate, RejectionReason> {
        let trimmed = raw.trim();
        NaiveDate::parse_from_str(trimmed, &self.settings.date_format).map_err(|_| {
            RejectionReason::InvalidDate {
                value: trimmed.to_string(),
            }
        })
    }
}

impl RowParser for RecordParser {
    fn parse(&self, row: &RawRow) -> Result<Transaction, RejectionReason> {
        let date = self.parse_date(row.get(Column::Date))?;
        let amount = parse_amount(row.get(Column::Value))?;

        let transaction = Transaction::new(date, amount, row.get(Column::Category))?
            .with_description(row.get(Column::Description))
            .with_subcategory(Some(row.get(Column::Subcategory)))
            .with_account(Some(row.get(Column::Account)))
            .with_tags(Some(row.get(Column::Tags)));

        Ok(transaction)
    }
}

/// Parse a locale-formatted decimal such as `-3.50`, `-3,50`, `1.234,56` or `1'234.56`.
///
/// When both separators appear the last one is the decimal point; a separator
/// that appears more than once only groups thousands. Zero and amounts above
/// [`MAX_AMOUNT`] are invalid.
pub fn parse_amount(raw: &str) -> Result<Decimal, RejectionReason> {
    let invalid = || RejectionReason::InvalidAmount {
        value: raw.trim().to_string(),
    };

    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'')
        .collect();

    if !AMOUNT_PATTERN.is_match(&compact) {
        return Err(invalid());
    }

    let decimal_separator = match (compact.rfind('.'), compact.rfind(',')) {
        (Some(dot), Some(comma)) => Some(if dot > comma { '.' } else { ',' }),
        (Some(_), None) if compact.matches('.').count() == 1 => Some('.'),
        (None, Some(_)) if compact.matches(',').count() == 1 => Some(','),
        _ => None,
    };

    if let Some(separator) = decimal_separator {
        if compact.matches(separator).count() > 1 {
            return Err(invalid());
        }
    }

    let mut normalized: String = compact
        .chars()
        .filter_map(|c| match c {
            '.' | ',' if Some(c) == decimal_separator => Some('.'),
            '.' | ',' => None,
            '+' => None,
            other => Some(other),
        })
        .collect();

    // ".5" and "-.5" get their leading zero back
    let digits_start = usize::from(normalized.starts_with('-'));
    if normalized[digits_start..].starts_with('.') {
        normalized.insert(digits_start, '0');
    }

    let amount = Decimal::from_str(&normalized).map_err(|_| invalid())?;
    if amount.is_zero() || amount.abs() > MAX_AMOUNT {
        return Err(invalid());
    }

    Ok(amount)
}
