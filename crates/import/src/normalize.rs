use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tally_core::{Money, StatementPeriod, Transaction, TransactionType};

use crate::date::DateToken;
use crate::extract::RawTransaction;
use crate::patterns::collapse_whitespace;
use crate::report::ParseIssue;

/// Which fields make two transactions "the same" for deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupKey {
    /// Date, description (case-folded), amount and type.
    #[default]
    Full,
    /// Like `Full`, but only the first N description characters count.
    DescriptionPrefix(usize),
    /// Date, amount and type; description ignored.
    DateAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Fingerprint {
    date: NaiveDate,
    kind: TransactionType,
    amount: Money,
    description: Option<String>,
}

impl DedupKey {
    fn fingerprint(self, tx: &Transaction) -> Fingerprint {
        let folded = || tx.description.to_uppercase();
        let description = match self {
            DedupKey::Full => Some(folded()),
            DedupKey::DescriptionPrefix(n) => Some(folded().chars().take(n).collect()),
            DedupKey::DateAmount => None,
        };
        Fingerprint {
            date: tx.date,
            kind: tx.kind,
            amount: tx.amount,
            description,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Statement period, preferred for anchoring month/day dates.
    pub period: Option<StatementPeriod>,
    /// Fallback year when no period is known.
    pub year: Option<i32>,
    pub dedup: DedupKey,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// In input order, first occurrence of each key.
    pub transactions: Vec<Transaction>,
    pub duplicates: usize,
    pub issues: Vec<ParseIssue>,
}

fn resolve_date(entry: &RawTransaction, options: &NormalizeOptions) -> Result<NaiveDate, ParseIssue> {
    let token = DateToken::parse(&entry.date)
        .ok_or_else(|| ParseIssue::unparseable(&entry.raw_line, format!("invalid date '{}'", entry.date)))?;

    let resolved = match (token.year, options.period, options.year) {
        (Some(_), _, _) => token.to_date(),
        (None, Some(period), _) => period.resolve(token.month, token.day),
        (None, None, Some(year)) => token.with_year(year),
        (None, None, None) => {
            return Err(ParseIssue::MissingYearContext {
                line: entry.raw_line.clone(),
                date: entry.date.clone(),
            })
        }
    };

    resolved.ok_or_else(|| {
        ParseIssue::unparseable(&entry.raw_line, format!("date '{}' does not exist", entry.date))
    })
}

/// Parse dates and amounts, then drop repeated entries. Pure; keeps input order.
pub fn normalize(raw: Vec<RawTransaction>, options: &NormalizeOptions) -> Normalized {
    let mut out = Normalized::default();
    let mut seen = HashSet::new();

    for entry in raw {
        let date = match resolve_date(&entry, options) {
            Ok(date) => date,
            Err(issue) => {
                tracing::warn!("{issue}");
                out.issues.push(issue);
                continue;
            }
        };

        let magnitude = match Money::parse_statement_amount(&entry.amount) {
            Ok(m) => m,
            Err(e) => {
                let issue = ParseIssue::unparseable(&entry.raw_line, e.to_string());
                tracing::warn!("{issue}");
                out.issues.push(issue);
                continue;
            }
        };

        let tx = Transaction::new(
            date,
            entry.kind,
            collapse_whitespace(&entry.description),
            magnitude,
            entry.raw_line,
        );

        if !seen.insert(options.dedup.fingerprint(&tx)) {
            tracing::debug!(date = %tx.date, amount = %tx.amount, "Duplicate dropped: {}", tx.description);
            out.duplicates += 1;
            continue;
        }
        out.transactions.push(tx);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Origin;

    fn raw(date: &str, kind: TransactionType, desc: &str, amount: &str, origin: Origin) -> RawTransaction {
        RawTransaction {
            date: date.to_string(),
            kind,
            description: desc.to_string(),
            amount: amount.to_string(),
            raw_line: format!("{date} {desc} {amount}"),
            origin,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn with_year(year: i32) -> NormalizeOptions {
        NormalizeOptions {
            year: Some(year),
            ..NormalizeOptions::default()
        }
    }

    // ── Dates and amounts ─────────────────────────────────────────────────────

    #[test]
    fn signs_follow_type() {
        let out = normalize(
            vec![
                raw("01/05", TransactionType::Deposit, "IN", "100.00", Origin::Text),
                raw("01/06", TransactionType::Withdrawal, "OUT", "-$50.00", Origin::Text),
            ],
            &with_year(2025),
        );
        assert_eq!(out.transactions[0].amount, Money::from_cents(10000));
        assert_eq!(out.transactions[1].amount, Money::from_cents(-5000));
        assert_eq!(out.transactions[0].date, date(2025, 1, 5));
    }

    #[test]
    fn period_anchors_year_across_new_year() {
        let options = NormalizeOptions {
            period: Some(StatementPeriod::new(date(2024, 12, 15), date(2025, 1, 14))),
            year: Some(1999),
            ..NormalizeOptions::default()
        };
        let out = normalize(
            vec![
                raw("12/20", TransactionType::Deposit, "A", "1.00", Origin::Text),
                raw("01/03", TransactionType::Deposit, "B", "2.00", Origin::Text),
            ],
            &options,
        );
        assert_eq!(out.transactions[0].date, date(2024, 12, 20));
        assert_eq!(out.transactions[1].date, date(2025, 1, 3));
    }

    #[test]
    fn printed_year_wins_over_context() {
        let out = normalize(
            vec![raw("03/07/23", TransactionType::Deposit, "A", "1.00", Origin::Text)],
            &with_year(2025),
        );
        assert_eq!(out.transactions[0].date, date(2023, 3, 7));
    }

    #[test]
    fn missing_year_drops_and_records() {
        let out = normalize(
            vec![raw("01/05", TransactionType::Deposit, "ACH", "1.00", Origin::Text)],
            &NormalizeOptions::default(),
        );
        assert!(out.transactions.is_empty());
        assert_eq!(out.issues.len(), 1);
        assert!(matches!(
            &out.issues[0],
            ParseIssue::MissingYearContext { date, .. } if date == "01/05"
        ));
    }

    #[test]
    fn impossible_dates_and_bad_amounts_are_dropped() {
        let out = normalize(
            vec![
                raw("02/29", TransactionType::Deposit, "A", "1.00", Origin::Text),
                raw("01/05", TransactionType::Deposit, "B", "one dollar", Origin::Text),
                raw("01/06", TransactionType::Deposit, "C", "3.00", Origin::Text),
            ],
            &with_year(2025),
        );
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transactions[0].description, "C");
        assert_eq!(out.issues.len(), 2);
        assert!(out.issues.iter().all(|i| matches!(i, ParseIssue::UnparseableLine { .. })));
    }

    // ── Deduplication ─────────────────────────────────────────────────────────

    #[test]
    fn same_entry_from_both_passes_collapses() {
        let out = normalize(
            vec![
                raw("01/05", TransactionType::Deposit, "ACH DEPOSIT XYZ", "100.00", Origin::Table),
                raw("01/05", TransactionType::Deposit, "ACH  DEPOSIT XYZ", "$100.00", Origin::Text),
            ],
            &with_year(2025),
        );
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.duplicates, 1);
        let tx = &out.transactions[0];
        assert_eq!(tx.date, date(2025, 1, 5));
        assert_eq!(tx.description, "ACH DEPOSIT XYZ");
        assert_eq!(tx.amount, Money::from_cents(10000));
        // First occurrence wins.
        assert_eq!(tx.raw_line, "01/05 ACH DEPOSIT XYZ 100.00");
    }

    #[test]
    fn type_is_part_of_the_key() {
        let out = normalize(
            vec![
                raw("01/05", TransactionType::Deposit, "TRANSFER", "10.00", Origin::Text),
                raw("01/05", TransactionType::Withdrawal, "TRANSFER", "10.00", Origin::Text),
            ],
            &with_year(2025),
        );
        assert_eq!(out.transactions.len(), 2);
    }

    #[test]
    fn alternative_keys() {
        let entries = vec![
            raw("01/05", TransactionType::Deposit, "PAYROLL ACME CORP REF 1", "10.00", Origin::Text),
            raw("01/05", TransactionType::Deposit, "PAYROLL ACME CORP REF 2", "10.00", Origin::Text),
            raw("01/05", TransactionType::Deposit, "SOMETHING ELSE", "10.00", Origin::Text),
        ];

        let full = normalize(entries.clone(), &with_year(2025));
        assert_eq!(full.transactions.len(), 3);

        let prefix = NormalizeOptions {
            dedup: DedupKey::DescriptionPrefix(17),
            ..with_year(2025)
        };
        assert_eq!(normalize(entries.clone(), &prefix).transactions.len(), 2);

        let date_amount = NormalizeOptions {
            dedup: DedupKey::DateAmount,
            ..with_year(2025)
        };
        assert_eq!(normalize(entries, &date_amount).transactions.len(), 1);
    }

    // ── Idempotence ───────────────────────────────────────────────────────────

    #[test]
    fn normalizing_twice_changes_nothing() {
        let entries = vec![
            raw("01/05", TransactionType::Deposit, "ACH DEPOSIT XYZ", "1,100.00", Origin::Table),
            raw("01/05", TransactionType::Deposit, "ACH DEPOSIT XYZ", "1,100.00", Origin::Text),
            raw("01/07", TransactionType::Withdrawal, "RENT  MARCH", "900.00", Origin::Text),
            raw("01/06", TransactionType::Withdrawal, "COFFEE", "4.50", Origin::Text),
        ];
        let options = with_year(2025);
        let once = normalize(entries, &options);
        let again = normalize(
            once.transactions.iter().map(RawTransaction::from).collect(),
            &NormalizeOptions::default(),
        );
        assert_eq!(again.transactions, once.transactions);
        assert_eq!(again.duplicates, 0);
        assert!(again.issues.is_empty());
    }

    #[test]
    fn dedup_key_deserializes() {
        #[derive(Deserialize)]
        struct Holder {
            dedup: DedupKey,
        }
        let h: Holder = serde_json::from_str(r#"{"dedup":"date-amount"}"#).unwrap();
        assert_eq!(h.dedup, DedupKey::DateAmount);
        let h: Holder = serde_json::from_str(r#"{"dedup":{"description-prefix":50}}"#).unwrap();
        assert_eq!(h.dedup, DedupKey::DescriptionPrefix(50));
    }
}
