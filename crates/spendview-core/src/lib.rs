//! Transaction aggregation and report data assembly
//!
//! Raw rows go through the record parser, accepted transactions go through the
//! aggregator, and the assembler packs the results into an immutable
//! [`ReportData`] for the renderer.

pub mod aggregator;
pub mod assembler;
pub mod error;
pub mod models;
pub mod time;

pub use aggregator::{
    average_savings_rate, category_monthly_averages, compute_balance_series, compute_overall_totals, group_by_month,
    group_by_year, rank_categories_by_expense,
};
pub use assembler::ReportAssembler;
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails};
pub use models::{
    BalancePoint, CategoryAverage, CategoryRank, CategorySummary, OverallTotals, Rejection,
    ReportData, SubcategoryAverage,
};

pub use spendview_parser::{PeriodKey, RawRow, RowSource, Transaction};
