pub mod aggregate;
pub mod classify;
pub mod date;
pub mod document;
pub mod extract;
pub mod normalize;
pub mod period;
pub mod report;
pub(crate) mod patterns;

pub use aggregate::{aggregate, sort_by_date, Aggregate, StatementTransactions};
pub use classify::{classify, ContinuationShape, EntryLine, LineClass, SectionState};
pub use document::{CellGrid, StatementDocument, TableGrid, TextDocument};
pub use extract::{extract, Extraction, Origin, RawTransaction};
pub use normalize::{normalize, DedupKey, NormalizeOptions, Normalized};
pub use patterns::collapse_whitespace;
pub use period::detect_period;
pub use report::{IssueKind, ParseIssue, StatementReport};

use tally_core::Transaction;

/// One statement after extraction and normalization, sorted by date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatement {
    pub transactions: Vec<Transaction>,
    pub report: StatementReport,
}

impl ParsedStatement {
    pub fn into_statement_transactions(self) -> (StatementTransactions, StatementReport) {
        let source = self.report.source.clone();
        (StatementTransactions::new(source, self.transactions), self.report)
    }
}

/// Extract, normalize and sort one statement. No I/O.
///
/// A period in `options` wins over one printed on the statement; the bare
/// year is only used when neither exists.
pub fn parse_statement<D: StatementDocument>(
    source: &str,
    doc: &D,
    options: &NormalizeOptions,
) -> ParsedStatement {
    let mut report = StatementReport::new(source);

    let mut options = options.clone();
    if options.period.is_none() {
        options.period = detect_period(doc.text_lines());
        if let Some(period) = options.period {
            tracing::debug!(source, %period, "Detected statement period");
        }
    }
    report.period = options.period;

    let extraction = extract(doc);
    report.extracted = extraction.entries.len();
    // Both passes can trip over the same line; it counts once.
    report.record_issues(extraction.issues);

    let normalized = normalize(extraction.entries, &options);
    report.duplicates = normalized.duplicates;
    report.record_issues(normalized.issues);

    let mut transactions = normalized.transactions;
    sort_by_date(&mut transactions);
    report.kept = transactions.len();

    ParsedStatement {
        transactions,
        report,
    }
}
