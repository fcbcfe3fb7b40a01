//! Report structures consumed by the renderer

use rust_decimal::Decimal;
use serde::Serialize;
use spendview_parser::{PeriodKey, RejectionReason, Transaction};
use std::collections::BTreeMap;

/// Totals of one (category, subcategory) bucket within a period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    /// `None` groups every row whose subcategory was missing or blank
    pub subcategory: Option<String>,
    /// Sum of negative amounts (zero or negative)
    pub total_expense: Decimal,
    /// Sum of positive amounts (zero or positive)
    pub total_income: Decimal,
    pub transaction_count: usize,
}

impl CategorySummary {
    pub fn new(category: impl Into<String>, subcategory: Option<String>) -> Self {
        Self {
            category: category.into(),
            subcategory,
            total_expense: Decimal::ZERO,
            total_income: Decimal::ZERO,
            transaction_count: 0,
        }
    }

    pub fn add(&mut self, transaction: &Transaction) {
        if transaction.is_expense() {
            self.total_expense = self.total_expense.saturating_add(transaction.amount());
        } else {
            self.total_income = self.total_income.saturating_add(transaction.amount());
        }
        self.transaction_count += 1;
    }

    pub fn net(&self) -> Decimal {
        self.total_income.saturating_add(self.total_expense)
    }
}

/// One month of the balance series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalancePoint {
    pub period: PeriodKey,
    pub income: Decimal,
    pub expense: Decimal,
    /// income + expense for the month
    pub net_amount: Decimal,
    /// Cumulative net up to and including this month
    pub running_balance: Decimal,
    /// Share of the month's income that was kept, in percent; zero without income
    pub savings_rate: Decimal,
}

/// Lifetime sums over every accepted transaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverallTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

/// Lifetime spend of a category, largest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRank {
    pub category: String,
    pub total_expense: Decimal,
    /// Percent of lifetime expense
    pub share: Decimal,
    /// Lifetime spend over the months of the observed range
    pub monthly_average: Decimal,
}

/// Average monthly spend of a category within one year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAverage {
    pub category: String,
    pub total_expense: Decimal,
    pub monthly_average: Decimal,
    pub subcategories: Vec<SubcategoryAverage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcategoryAverage {
    pub subcategory: Option<String>,
    pub total_expense: Decimal,
    pub monthly_average: Decimal,
}

/// A row that did not validate, kept with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub source: String,
    /// 1-based data row index within the source
    pub row: usize,
    pub reason: RejectionReason,
    pub fields: Vec<String>,
}

/// Root aggregate handed to the renderer.
///
/// Built once per run by the assembler and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportData {
    pub(crate) title: String,
    pub(crate) currency_symbol: String,
    pub(crate) balance_series: Vec<BalancePoint>,
    pub(crate) monthly: BTreeMap<PeriodKey, Vec<CategorySummary>>,
    pub(crate) yearly: BTreeMap<i32, Vec<CategorySummary>>,
    pub(crate) totals: OverallTotals,
    pub(crate) average_savings_rate: Decimal,
    pub(crate) category_ranking: Vec<CategoryRank>,
    pub(crate) category_averages: BTreeMap<i32, Vec<CategoryAverage>>,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) rejections: Vec<Rejection>,
}

impl ReportData {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display label only; never used in calculations
    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    /// Chronological, one point per month that has transactions
    pub fn balance_series(&self) -> &[BalancePoint] {
        &self.balance_series
    }

    pub fn monthly(&self) -> &BTreeMap<PeriodKey, Vec<CategorySummary>> {
        &self.monthly
    }

    pub fn yearly(&self) -> &BTreeMap<i32, Vec<CategorySummary>> {
        &self.yearly
    }

    pub fn totals(&self) -> &OverallTotals {
        &self.totals
    }

    /// Mean monthly savings rate over the balance series, in percent
    pub fn average_savings_rate(&self) -> Decimal {
        self.average_savings_rate
    }

    pub fn category_ranking(&self) -> &[CategoryRank] {
        &self.category_ranking
    }

    pub fn category_averages(&self) -> &BTreeMap<i32, Vec<CategoryAverage>> {
        &self.category_averages
    }

    /// Accepted transactions in input order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
