//! Report data assembly: parse every row of every source, then aggregate once

use spendview_config::Config;
use spendview_parser::{ParserRef, RecordParser, RowSource, Transaction};
use std::sync::Arc;

use crate::aggregator;
use crate::error::{CoreError, CoreResult};
use crate::models::{Rejection, ReportData};

/// Builds [`ReportData`] from raw row sources.
///
/// Holds only immutable settings, so one assembler can serve concurrent runs;
/// each call to [`ReportAssembler::assemble`] owns its own aggregation state.
pub struct ReportAssembler {
    parser: ParserRef,
    title: String,
    currency_symbol: String,
}

impl ReportAssembler {
    /// Assembler with the default record parser built from `config`
    pub fn new(config: &Config) -> CoreResult<Self> {
        config.validate()?;
        let parser = Arc::new(RecordParser::new(config.parser_settings()));
        Ok(Self::with_parser(config, parser))
    }

    /// Assembler with a caller supplied row parser
    pub fn with_parser(config: &Config, parser: ParserRef) -> Self {
        Self {
            parser,
            title: config.report.title.clone(),
            currency_symbol: config.report.currency_symbol.clone(),
        }
    }

    /// Parse and aggregate `sources` in order.
    ///
    /// Never fails: bad rows become rejections, and no rows at all is a valid
    /// report with empty series and zero totals.
    pub fn assemble(&self, sources: &[RowSource]) -> ReportData {
        let mut transactions: Vec<Transaction> = Vec::new();
        let mut rejections: Vec<Rejection> = Vec::new();

        for source in sources {
            let before = (transactions.len(), rejections.len());

            for row in &source.rows {
                match self.parser.parse(row) {
                    Ok(tx) => transactions.push(tx),
                    Err(reason) => {
                        log::debug!(
                            target: "spendview::assembler",
                            "Rejected row {} of {}: {}",
                            row.index,
                            source.id,
                            reason
                        );
                        rejections.push(Rejection {
                            source: source.id.clone(),
                            row: row.index,
                            reason,
                            fields: row.fields.clone(),
                        });
                    }
                }
            }

            log::info!(
                target: "spendview::assembler",
                "Source {}: {} accepted, {} rejected",
                source.id,
                transactions.len() - before.0,
                rejections.len() - before.1
            );
        }

        if transactions.is_empty() {
            log::warn!(
                target: "spendview::assembler",
                "No transactions accepted from {} source(s); the report will be empty",
                sources.len()
            );
        }

        self.build(transactions, rejections)
    }

    /// Decode `(id, text)` pairs and assemble them.
    ///
    /// A source with a missing or mismatched header stops the run instead of
    /// guessing its column order.
    pub fn assemble_text<'a, I>(&self, texts: I) -> CoreResult<ReportData>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let sources = texts
            .into_iter()
            .map(|(id, text)| {
                RowSource::from_delimited(id, text).map_err(|error| CoreError::Source {
                    source_id: id.to_string(),
                    error,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(self.assemble(&sources))
    }

    fn build(&self, transactions: Vec<Transaction>, rejections: Vec<Rejection>) -> ReportData {
        let balance_series = aggregator::compute_balance_series(&transactions);

        ReportData {
            title: self.title.clone(),
            currency_symbol: self.currency_symbol.clone(),
            average_savings_rate: aggregator::average_savings_rate(&balance_series),
            balance_series,
            monthly: aggregator::group_by_month(&transactions),
            yearly: aggregator::group_by_year(&transactions),
            totals: aggregator::compute_overall_totals(&transactions),
            category_ranking: aggregator::rank_categories_by_expense(&transactions),
            category_averages: aggregator::category_monthly_averages(&transactions),
            transactions,
            rejections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use spendview_parser::{RawRow, RejectionReason};

    fn row(index: usize, fields: &[&str]) -> RawRow {
        RawRow::new(index, fields.iter().map(|s| s.to_string()).collect())
    }

    fn assembler() -> ReportAssembler {
        ReportAssembler::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_no_sources_is_an_empty_report() {
        let report = assembler().assemble(&[]);
        assert!(report.is_empty());
        assert!(report.balance_series().is_empty());
        assert!(report.monthly().is_empty());
        assert!(report.yearly().is_empty());
        assert_eq!(report.totals().net, Decimal::ZERO);
        assert!(report.rejections().is_empty());
    }

    #[test]
    fn test_rejections_keep_context() {
        let source = RowSource::new(
            "a.csv",
            vec![
                row(1, &["01/01/2023", "Coffee", "-3.50", "", "Food", "", ""]),
                row(2, &["01/01/2023", "Broken", "abc", "", "Food", "", ""]),
                row(3, &["xx", "Broken", "-1", "", "Food", "", ""]),
            ],
        );
        let report = assembler().assemble(&[source]);

        assert_eq!(report.transactions().len(), 1);
        assert_eq!(report.rejections().len(), 2);
        let first = &report.rejections()[0];
        assert_eq!(first.source, "a.csv");
        assert_eq!(first.row, 2);
        assert_eq!(first.reason, RejectionReason::InvalidAmount { value: "abc".to_string() });
        assert_eq!(first.fields[1], "Broken");
        assert!(matches!(report.rejections()[1].reason, RejectionReason::InvalidDate { .. }));
    }

    #[test]
    fn test_all_rows_rejected_still_builds() {
        let source = RowSource::new("bad.csv", vec![row(1, &["", "", "", "", "", "", ""])]);
        let report = assembler().assemble(&[source]);
        assert!(report.is_empty());
        assert_eq!(report.rejections().len(), 1);
        assert!(report.balance_series().is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let fields = ["05/03/2023", "Bus", "-2.00", "", "Transport", "Bus", ""];
        let source = RowSource::new("a.csv", vec![row(1, &fields), row(2, &fields)]);
        let report = assembler().assemble(&[source]);

        assert_eq!(report.transactions().len(), 2);
        assert_eq!(report.totals().expense, Decimal::new(-400, 2));
        let march = &report.monthly()[&spendview_parser::PeriodKey::new(2023, 3)];
        assert_eq!(march[0].transaction_count, 2);
    }

    #[test]
    fn test_sources_keep_input_order() {
        let later = RowSource::new("b.csv", vec![row(1, &["01/02/2023", "B", "-1", "", "X", "", ""])]);
        let earlier = RowSource::new("a.csv", vec![row(1, &["01/01/2023", "A", "-1", "", "X", "", ""])]);
        let report = assembler().assemble(&[later, earlier]);

        let descriptions: Vec<&str> = report.transactions().iter().map(|t| t.description()).collect();
        assert_eq!(descriptions, vec!["B", "A"]);
        // the balance series is still chronological
        assert_eq!(report.balance_series()[0].period.to_string(), "2023-01");
    }

    #[test]
    fn test_display_settings_pass_through() {
        let mut config = Config::default();
        config.report.currency_symbol = "CHF".to_string();
        config.report.title = "Household".to_string();
        let report = ReportAssembler::new(&config).unwrap().assemble(&[]);
        assert_eq!(report.currency_symbol(), "CHF");
        assert_eq!(report.title(), "Household");
    }

    #[test]
    fn test_invalid_config_is_refused() {
        let mut config = Config::default();
        config.input.date_format = String::new();
        assert!(matches!(ReportAssembler::new(&config), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_assemble_text_rejects_bad_header() {
        let result = assembler().assemble_text([("broken.csv", "Date;Value\n01/01/2023;1\n")]);
        match result {
            Err(CoreError::Source { source_id, .. }) => assert_eq!(source_id, "broken.csv"),
            other => panic!("expected a source error, got {:?}", other.map(|r| r.transactions().len())),
        }
    }
}
