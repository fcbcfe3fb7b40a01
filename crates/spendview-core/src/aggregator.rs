//! Grouping and summarizing of validated transactions
//!
//! Every function here is a pure fold over a slice of transactions. Maps are
//! ordered (`BTreeMap`) and ties keep input order, so the same input always
//! produces the same output. Sums saturate at the `Decimal` bounds instead of
//! panicking.

use rust_decimal::Decimal;
use spendview_parser::{PeriodKey, Transaction};
use std::collections::BTreeMap;

use crate::models::{
    BalancePoint, CategoryAverage, CategoryRank, CategorySummary, OverallTotals,
    SubcategoryAverage,
};
use crate::time::{months_covered, months_in_range, observed_range};

type BucketKey = (String, Option<String>);

/// Category summaries per (year, month)
pub fn group_by_month(transactions: &[Transaction]) -> BTreeMap<PeriodKey, Vec<CategorySummary>> {
    group_by(transactions, Transaction::period)
}

/// Category summaries per year
pub fn group_by_year(transactions: &[Transaction]) -> BTreeMap<i32, Vec<CategorySummary>> {
    group_by(transactions, Transaction::year)
}

fn group_by<K, F>(transactions: &[Transaction], period: F) -> BTreeMap<K, Vec<CategorySummary>>
where
    K: Ord,
    F: Fn(&Transaction) -> K,
{
    let mut buckets: BTreeMap<K, BTreeMap<BucketKey, CategorySummary>> = BTreeMap::new();

    for tx in transactions {
        let key = (tx.category().to_string(), tx.subcategory().map(str::to_string));
        buckets
            .entry(period(tx))
            .or_default()
            .entry(key)
            .or_insert_with_key(|(category, subcategory)| {
                CategorySummary::new(category.clone(), subcategory.clone())
            })
            .add(tx);
    }

    buckets
        .into_iter()
        .map(|(period, summaries)| (period, summaries.into_values().collect()))
        .collect()
}

/// Monthly net and running balance, one point per month with transactions.
///
/// Transactions are ordered by date with a stable sort; months without
/// transactions are skipped rather than filled with zeros.
pub fn compute_balance_series(transactions: &[Transaction]) -> Vec<BalancePoint> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|tx| tx.date());

    let mut points: Vec<BalancePoint> = Vec::new();
    for tx in ordered {
        let period = tx.period();
        let start_new = points.last().map_or(true, |p| p.period != period);
        if start_new {
            points.push(BalancePoint {
                period,
                income: Decimal::ZERO,
                expense: Decimal::ZERO,
                net_amount: Decimal::ZERO,
                running_balance: Decimal::ZERO,
                savings_rate: Decimal::ZERO,
            });
        }

        if let Some(point) = points.last_mut() {
            if tx.is_expense() {
                point.expense = point.expense.saturating_add(tx.amount());
            } else {
                point.income = point.income.saturating_add(tx.amount());
            }
            point.net_amount = point.net_amount.saturating_add(tx.amount());
        }
    }

    let mut running = Decimal::ZERO;
    for point in &mut points {
        running = running.saturating_add(point.net_amount);
        point.running_balance = running;
        point.savings_rate = savings_rate(point.income, point.expense);
    }

    points
}

/// Lifetime income, expense and net
pub fn compute_overall_totals(transactions: &[Transaction]) -> OverallTotals {
    transactions.iter().fold(OverallTotals::default(), |mut totals, tx| {
        if tx.is_expense() {
            totals.expense = totals.expense.saturating_add(tx.amount());
        } else {
            totals.income = totals.income.saturating_add(tx.amount());
        }
        totals.net = totals.net.saturating_add(tx.amount());
        totals
    })
}

/// Mean of the monthly savings rates, months without transactions excluded
pub fn average_savings_rate(series: &[BalancePoint]) -> Decimal {
    let total = series
        .iter()
        .fold(Decimal::ZERO, |acc, point| acc.saturating_add(point.savings_rate));
    average(total, Decimal::from(series.len()))
}

/// Categories by lifetime spend, largest first, ties by name.
///
/// The monthly average spreads the lifetime spend over every month of the
/// observed range, empty months included.
pub fn rank_categories_by_expense(transactions: &[Transaction]) -> Vec<CategoryRank> {
    let mut spend: BTreeMap<&str, Decimal> = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        let total = spend.entry(tx.category()).or_insert(Decimal::ZERO);
        *total = total.saturating_add(tx.amount());
    }

    let lifetime_expense = spend
        .values()
        .fold(Decimal::ZERO, |acc, total| acc.saturating_add(*total));
    let months = observed_range(transactions)
        .map(|range| Decimal::from(months_in_range(range)))
        .unwrap_or(Decimal::ONE);

    let mut ranking: Vec<CategoryRank> = spend
        .into_iter()
        .map(|(category, total_expense)| CategoryRank {
            category: category.to_string(),
            total_expense,
            share: percentage(total_expense, lifetime_expense),
            monthly_average: average(total_expense, months),
        })
        .collect();

    // Expenses are negative: ascending puts the biggest spend first
    ranking.sort_by(|a, b| {
        a.total_expense
            .cmp(&b.total_expense)
            .then_with(|| a.category.cmp(&b.category))
    });

    ranking
}

/// Average monthly spend per category (and subcategory) for every year.
///
/// The divisor is the number of months of that year inside the observed data
/// range, so a year still in progress is not diluted by future months.
pub fn category_monthly_averages(transactions: &[Transaction]) -> BTreeMap<i32, Vec<CategoryAverage>> {
    let Some(range) = observed_range(transactions) else {
        return BTreeMap::new();
    };

    let expenses: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| tx.is_expense())
        .cloned()
        .collect();

    group_by_year(&expenses)
        .into_iter()
        .map(|(year, summaries)| {
            let months = Decimal::from(months_covered(range, year).max(1));
            (year, averages_for_year(summaries, months))
        })
        .collect()
}

fn averages_for_year(summaries: Vec<CategorySummary>, months: Decimal) -> Vec<CategoryAverage> {
    let mut averages: Vec<CategoryAverage> = Vec::new();

    // Summaries arrive sorted by (category, subcategory)
    for summary in summaries {
        let sub = SubcategoryAverage {
            subcategory: summary.subcategory,
            total_expense: summary.total_expense,
            monthly_average: average(summary.total_expense, months),
        };

        match averages.last_mut() {
            Some(current) if current.category == summary.category => {
                current.total_expense = current.total_expense.saturating_add(sub.total_expense);
                current.subcategories.push(sub);
            }
            _ => averages.push(CategoryAverage {
                category: summary.category,
                total_expense: sub.total_expense,
                monthly_average: Decimal::ZERO,
                subcategories: vec![sub],
            }),
        }
    }

    for category in &mut averages {
        category.monthly_average = average(category.total_expense, months);
    }

    averages
}

fn average(total: Decimal, months: Decimal) -> Decimal {
    total
        .checked_div(months)
        .map(|v| v.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .map(|ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED).round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

fn savings_rate(income: Decimal, expense: Decimal) -> Decimal {
    percentage(income.saturating_add(expense), income)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tx(date: (i32, u32, u32), amount: &str, category: &str, sub: Option<&str>) -> Transaction {
        let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        Transaction::new(date, d(amount), category)
            .unwrap()
            .with_subcategory(sub)
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx((2023, 2, 3), "-10.00", "Food", Some("Supermarket")),
            tx((2023, 1, 1), "-3.50", "Food", Some("Drinks")),
            tx((2023, 1, 1), "2000.00", "Income", None),
            tx((2023, 1, 20), "-1.50", "Food", Some("Drinks")),
            tx((2023, 2, 28), "100.00", "Income", Some("  ")),
            tx((2024, 3, 1), "-50.00", "Car", Some("Petrol")),
        ]
    }

    #[test]
    fn test_group_by_month_buckets() {
        let monthly = group_by_month(&sample());
        assert_eq!(monthly.len(), 3);

        let january = &monthly[&PeriodKey::new(2023, 1)];
        assert_eq!(january.len(), 2);
        assert_eq!(january[0].category, "Food");
        assert_eq!(january[0].subcategory.as_deref(), Some("Drinks"));
        assert_eq!(january[0].total_expense, d("-5.00"));
        assert_eq!(january[0].total_income, Decimal::ZERO);
        assert_eq!(january[0].transaction_count, 2);
        assert_eq!(january[1].category, "Income");
        assert_eq!(january[1].subcategory, None);
        assert_eq!(january[1].total_income, d("2000.00"));
    }

    #[test]
    fn test_group_by_year_collapses_months() {
        let yearly = group_by_year(&sample());
        assert_eq!(yearly.keys().copied().collect::<Vec<_>>(), vec![2023, 2024]);

        let y2023 = &yearly[&2023];
        let income: Vec<_> = y2023.iter().filter(|s| s.category == "Income").collect();
        // blank and missing subcategory land in the same bucket
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].total_income, d("2100.00"));
        assert_eq!(income[0].transaction_count, 2);
    }

    #[test]
    fn test_mixed_signs_in_one_bucket() {
        let txs = vec![
            tx((2023, 5, 1), "-20", "Shopping", None),
            tx((2023, 5, 2), "5", "Shopping", None),
        ];
        let monthly = group_by_month(&txs);
        let summary = &monthly[&PeriodKey::new(2023, 5)][0];
        assert_eq!(summary.total_expense, d("-20"));
        assert_eq!(summary.total_income, d("5"));
        assert_eq!(summary.net(), d("-15"));
        assert_eq!(summary.transaction_count, 2);
    }

    #[test]
    fn test_balance_series_sparse_and_cumulative() {
        let series = compute_balance_series(&sample());
        let periods: Vec<String> = series.iter().map(|p| p.period.to_string()).collect();
        // 2023-03 .. 2024-02 are not synthesized
        assert_eq!(periods, vec!["2023-01", "2023-02", "2024-03"]);

        assert_eq!(series[0].net_amount, d("1995.00"));
        assert_eq!(series[0].running_balance, d("1995.00"));
        assert_eq!(series[1].net_amount, d("90.00"));
        assert_eq!(series[1].running_balance, d("2085.00"));
        assert_eq!(series[2].running_balance, d("2035.00"));
        assert_eq!(series[2].income, Decimal::ZERO);
        assert_eq!(series[2].expense, d("-50.00"));
    }

    #[test]
    fn test_last_running_balance_matches_totals() {
        let txs = sample();
        let series = compute_balance_series(&txs);
        let totals = compute_overall_totals(&txs);
        assert_eq!(series.last().unwrap().running_balance, totals.income + totals.expense);
        assert_eq!(totals.net, totals.income + totals.expense);
    }

    #[test]
    fn test_monthly_summaries_sum_to_net_amount() {
        let txs = sample();
        let monthly = group_by_month(&txs);
        for point in compute_balance_series(&txs) {
            let sum: Decimal = monthly[&point.period].iter().map(CategorySummary::net).sum();
            assert_eq!(sum, point.net_amount, "period {}", point.period);
        }
    }

    #[test]
    fn test_savings_rate() {
        let series = compute_balance_series(&sample());
        // (2000 - 5) / 2000
        assert_eq!(series[0].savings_rate, d("99.75"));
        assert_eq!(series[2].savings_rate, Decimal::ZERO);
    }

    #[test]
    fn test_overall_totals() {
        let totals = compute_overall_totals(&sample());
        assert_eq!(totals.income, d("2100.00"));
        assert_eq!(totals.expense, d("-65.00"));
        assert_eq!(totals.net, d("2035.00"));
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_month(&[]).is_empty());
        assert!(group_by_year(&[]).is_empty());
        assert!(compute_balance_series(&[]).is_empty());
        assert_eq!(compute_overall_totals(&[]), OverallTotals::default());
        assert!(rank_categories_by_expense(&[]).is_empty());
        assert!(category_monthly_averages(&[]).is_empty());
    }

    #[test]
    fn test_rank_categories_by_expense() {
        let ranking = rank_categories_by_expense(&sample());
        let names: Vec<&str> = ranking.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["Car", "Food"]);
        assert_eq!(ranking[0].total_expense, d("-50.00"));
        assert_eq!(ranking[0].share, d("76.92"));
        assert_eq!(ranking[1].share, d("23.08"));
    }

    #[test]
    fn test_category_monthly_averages() {
        let averages = category_monthly_averages(&sample());

        // data spans 2023-01 .. 2024-03: twelve months in 2023, three in 2024
        let y2023 = &averages[&2023];
        assert_eq!(y2023.len(), 1);
        assert_eq!(y2023[0].category, "Food");
        assert_eq!(y2023[0].total_expense, d("-15.00"));
        assert_eq!(y2023[0].monthly_average, d("-1.25"));
        assert_eq!(y2023[0].subcategories.len(), 2);

        let y2024 = &averages[&2024];
        assert_eq!(y2024[0].category, "Car");
        assert_eq!(y2024[0].monthly_average, d("-16.67"));
    }

    #[test]
    fn test_ranking_monthly_average_spans_whole_range() {
        let ranking = rank_categories_by_expense(&sample());
        // 2023-01 .. 2024-03 is fifteen months, empty ones included
        assert_eq!(ranking[0].monthly_average, d("-3.33"));
        assert_eq!(ranking[1].monthly_average, d("-1.00"));
    }

    #[test]
    fn test_average_savings_rate() {
        let series = compute_balance_series(&sample());
        // (99.75 + 90.00 + 0) / 3
        assert_eq!(average_savings_rate(&series), d("63.25"));
        assert_eq!(average_savings_rate(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_sums_saturate_instead_of_overflowing() {
        let txs = vec![
            tx((2023, 1, 1), &Decimal::MAX.to_string(), "Income", None),
            tx((2023, 1, 2), &Decimal::MAX.to_string(), "Income", None),
            tx((2023, 1, 3), &Decimal::MIN.to_string(), "Food", None),
            tx((2023, 1, 4), &Decimal::MIN.to_string(), "Food", None),
        ];

        let totals = compute_overall_totals(&txs);
        assert_eq!(totals.income, Decimal::MAX);
        assert_eq!(totals.expense, Decimal::MIN);

        let monthly = group_by_month(&txs);
        let january = &monthly[&PeriodKey::new(2023, 1)];
        assert_eq!(january[0].total_expense, Decimal::MIN);
        assert_eq!(january[1].total_income, Decimal::MAX);

        let series = compute_balance_series(&txs);
        assert_eq!(series[0].income, Decimal::MAX);
        assert_eq!(series[0].expense, Decimal::MIN);

        let ranking = rank_categories_by_expense(&txs);
        assert_eq!(ranking[0].total_expense, Decimal::MIN);
        assert_eq!(ranking[0].share, d("100"));
        assert_eq!(category_monthly_averages(&txs)[&2023][0].total_expense, Decimal::MIN);
    }

    #[test]
    fn test_savings_rate_saturates_on_tiny_income() {
        let txs = vec![
            tx((2023, 1, 1), "0.000001", "Income", None),
            tx((2023, 1, 2), "-70000000000000000000000", "Food", None),
        ];
        let series = compute_balance_series(&txs);
        assert_eq!(series[0].savings_rate, Decimal::MIN);
    }

    #[test]
    fn test_same_day_order_is_stable() {
        let txs = vec![
            tx((2023, 1, 1), "5", "A", None),
            tx((2023, 1, 1), "-5", "A", None),
            tx((2023, 1, 1), "5", "A", None),
        ];
        let first = compute_balance_series(&txs);
        let second = compute_balance_series(&txs);
        assert_eq!(first, second);
        assert_eq!(first[0].net_amount, d("5"));
    }
}
