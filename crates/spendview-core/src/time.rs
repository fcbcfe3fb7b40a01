//! Calendar helpers for period based averages

use spendview_parser::{PeriodKey, Transaction};

/// First and last month that hold at least one transaction
pub fn observed_range(transactions: &[Transaction]) -> Option<(PeriodKey, PeriodKey)> {
    let first = transactions.iter().map(Transaction::period).min()?;
    let last = transactions.iter().map(Transaction::period).max()?;
    Some((first, last))
}

/// Number of months of `year` inside the observed range.
///
/// A partially covered first or last year only counts its covered months, so a
/// year that started in October averages over three months, not twelve.
pub fn months_covered(range: (PeriodKey, PeriodKey), year: i32) -> u32 {
    let (first, last) = range;
    if year < first.year || year > last.year {
        return 0;
    }

    let start = if year == first.year { first.month } else { 1 };
    let end = if year == last.year { last.month } else { 12 };
    end + 1 - start
}

/// Every month from the first to the last observed month, empty ones included
pub fn months_in_range(range: (PeriodKey, PeriodKey)) -> u32 {
    (range.0.year..=range.1.year)
        .map(|year| months_covered(range, year))
        .sum()
}
