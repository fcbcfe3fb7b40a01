//! Transaction model shared by the parser and the aggregation core

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::error::RejectionReason;

/// Column order of the exported files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Description,
    Value,
    Account,
    Category,
    Subcategory,
    Tags,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Date,
        Column::Description,
        Column::Value,
        Column::Account,
        Column::Category,
        Column::Subcategory,
        Column::Tags,
    ];

    /// Header name, case-sensitive
    pub fn header(&self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Description => "Description",
            Column::Value => "Value",
            Column::Account => "Account",
            Column::Category => "Category",
            Column::Subcategory => "Subcategory",
            Column::Tags => "Tags",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// One undecoded data row of a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based position among the data rows of its source
    pub index: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn new(index: usize, fields: Vec<String>) -> Self {
        Self { index, fields }
    }

    /// Field by column; a missing trailing field reads as empty
    pub fn get(&self, column: Column) -> &str {
        self.fields
            .get(column.index())
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

/// Monthly grouping key, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    pub year: i32,
    pub month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl std::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// Serialized as "YYYY-MM" so it can key a JSON object
impl Serialize for PeriodKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Direction of money, decided by the sign of the amount alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    Income,
    Expense,
}

/// A validated financial event.
///
/// Only constructible through [`Transaction::new`], so the amount is never
/// zero and the category is never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    date: NaiveDate,
    description: String,
    /// Negative = expense, positive = income
    amount: Decimal,
    category: String,
    subcategory: Option<String>,
    /// Carried through for detail views; no aggregation semantics
    account: Option<String>,
    tags: Option<String>,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        amount: Decimal,
        category: impl AsRef<str>,
    ) -> Result<Self, RejectionReason> {
        if amount.is_zero() {
            return Err(RejectionReason::InvalidAmount {
                value: amount.to_string(),
            });
        }

        let category = category.as_ref().trim();
        if category.is_empty() {
            return Err(RejectionReason::MissingCategory);
        }

        Ok(Self {
            date,
            description: String::new(),
            amount,
            category: category.to_string(),
            subcategory: None,
            account: None,
            tags: None,
        })
    }

    pub fn with_description(mut self, description: impl AsRef<str>) -> Self {
        self.description = description.as_ref().trim().to_string();
        self
    }

    /// Blank subcategories collapse into "no subcategory"
    pub fn with_subcategory(mut self, subcategory: Option<&str>) -> Self {
        self.subcategory = non_blank(subcategory);
        self
    }

    pub fn with_account(mut self, account: Option<&str>) -> Self {
        self.account = non_blank(account);
        self
    }

    pub fn with_tags(mut self, tags: Option<&str>) -> Self {
        self.tags = non_blank(tags);
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn tags(&self) -> Option<&str> {
        self.tags.as_deref()
    }

    pub fn flow(&self) -> Flow {
        if self.amount.is_sign_negative() {
            Flow::Expense
        } else {
            Flow::Income
        }
    }

    pub fn is_expense(&self) -> bool {
        self.flow() == Flow::Expense
    }

    pub fn is_income(&self) -> bool {
        self.flow() == Flow::Income
    }

    pub fn period(&self) -> PeriodKey {
        PeriodKey::from_date(self.date)
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_transaction_creation() {
        let tx = Transaction::new(date(2023, 1, 1), Decimal::from_str("-3.50").unwrap(), " Food ")
            .unwrap()
            .with_description("Coffee")
            .with_subcategory(Some("Drinks"))
            .with_account(Some("Wallet"))
            .with_tags(Some(""));

        assert_eq!(tx.category(), "Food");
        assert_eq!(tx.subcategory(), Some("Drinks"));
        assert_eq!(tx.account(), Some("Wallet"));
        assert_eq!(tx.tags(), None);
        assert_eq!(tx.flow(), Flow::Expense);
        assert!(tx.is_expense());
        assert_eq!(tx.period(), PeriodKey::new(2023, 1));
        assert_eq!(tx.year(), 2023);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let err = Transaction::new(date(2023, 1, 1), Decimal::ZERO, "Food").unwrap_err();
        assert!(matches!(err, RejectionReason::InvalidAmount { .. }));
    }

    #[test]
    fn test_blank_category_rejected() {
        let err = Transaction::new(date(2023, 1, 1), Decimal::ONE, "   ").unwrap_err();
        assert_eq!(err, RejectionReason::MissingCategory);
    }

    #[test]
    fn test_whitespace_subcategory_is_absent() {
        let blank = Transaction::new(date(2023, 1, 1), Decimal::ONE, "Income")
            .unwrap()
            .with_subcategory(Some("   "));
        let missing = Transaction::new(date(2023, 1, 1), Decimal::ONE, "Income")
            .unwrap()
            .with_subcategory(None);
        assert_eq!(blank, missing);
        assert_eq!(blank.subcategory(), None);
    }

    #[test]
    fn test_period_key_order_and_display() {
        let mut keys = vec![
            PeriodKey::new(2023, 2),
            PeriodKey::new(2022, 12),
            PeriodKey::new(2023, 1),
        ];
        keys.sort();
        assert_eq!(keys[0], PeriodKey::new(2022, 12));
        assert_eq!(keys[2].to_string(), "2023-02");
    }

    #[test]
    fn test_raw_row_missing_fields_read_empty() {
        let row = RawRow::new(4, vec!["01/01/2023".to_string(), "Coffee".to_string()]);
        assert_eq!(row.index, 4);
        assert_eq!(row.get(Column::Date), "01/01/2023");
        assert_eq!(row.get(Column::Tags), "");
    }

    #[test]
    fn test_column_headers() {
        let headers: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
        assert_eq!(
            headers,
            vec!["Date", "Description", "Value", "Account", "Category", "Subcategory", "Tags"]
        );
    }
}
