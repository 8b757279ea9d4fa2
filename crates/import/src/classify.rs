use tally_core::TransactionType;

use crate::patterns::{
    re_amount_any, re_column_header, re_continued_banner, re_date_token_any, re_deposit_header,
    re_entry_line, re_page_counter, re_section_end, re_total_line, re_withdrawal_header,
};

/// Which section of the statement the scanner is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionState {
    #[default]
    Outside,
    In(TransactionType),
}

impl SectionState {
    pub fn kind(self) -> Option<TransactionType> {
        match self {
            SectionState::Outside => None,
            SectionState::In(kind) => Some(kind),
        }
    }
}

/// The pieces of a line that starts a new transaction, still as printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLine {
    pub date: String,
    pub description: String,
    pub amount: String,
    /// Running balance printed after the amount, if any.
    pub balance: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuationShape {
    Plain,
    /// Holds a date and an amount but not in the leading-date entry layout.
    LooksLikeEntry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    NewEntry(EntryLine),
    Continuation(ContinuationShape),
    SectionHeader(TransactionType),
    /// Totals or a following statement block; closes the current section.
    SectionEnd,
    Noise,
}

pub fn section_header(line: &str) -> Option<TransactionType> {
    if re_deposit_header().is_match(line) {
        Some(TransactionType::Deposit)
    } else if re_withdrawal_header().is_match(line) {
        Some(TransactionType::Withdrawal)
    } else {
        None
    }
}

fn is_boilerplate(line: &str) -> bool {
    re_page_counter().is_match(line)
        || re_column_header().is_match(line)
        || re_continued_banner().is_match(line)
}

pub fn parse_entry_line(line: &str) -> Option<EntryLine> {
    let caps = re_entry_line().captures(line)?;
    Some(EntryLine {
        date: caps["date"].to_string(),
        description: caps["desc"].trim().to_string(),
        amount: caps["amount"].to_string(),
        balance: caps.name("balance").map(|m| m.as_str().to_string()),
    })
}

pub fn classify(line: &str, section: SectionState) -> LineClass {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineClass::Noise;
    }

    if let Some(kind) = section_header(trimmed) {
        return LineClass::SectionHeader(kind);
    }

    if section == SectionState::Outside {
        return LineClass::Noise;
    }

    if re_total_line().is_match(trimmed) {
        return LineClass::SectionEnd;
    }

    if is_boilerplate(trimmed) {
        return LineClass::Noise;
    }

    if let Some(entry) = parse_entry_line(trimmed) {
        return LineClass::NewEntry(entry);
    }

    if re_section_end().is_match(trimmed) {
        return LineClass::SectionEnd;
    }

    if re_date_token_any().is_match(trimmed) && re_amount_any().is_match(trimmed) {
        LineClass::Continuation(ContinuationShape::LooksLikeEntry)
    } else {
        LineClass::Continuation(ContinuationShape::Plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPOSITS: SectionState = SectionState::In(TransactionType::Deposit);
    const WITHDRAWALS: SectionState = SectionState::In(TransactionType::Withdrawal);

    // ── Section headers ───────────────────────────────────────────────────────

    #[test]
    fn recognises_headers_case_insensitively() {
        for (line, kind) in [
            ("Deposits and other credits", TransactionType::Deposit),
            ("DEPOSITS AND OTHER CREDITS", TransactionType::Deposit),
            ("Deposits and other additions", TransactionType::Deposit),
            ("Withdrawals and other debits", TransactionType::Withdrawal),
            ("Withdrawals and other debits - continued", TransactionType::Withdrawal),
            ("  withdrawals and other subtractions (continued)", TransactionType::Withdrawal),
        ] {
            assert_eq!(
                classify(line, SectionState::Outside),
                LineClass::SectionHeader(kind),
                "{line}"
            );
        }
    }

    #[test]
    fn total_line_is_not_a_header() {
        assert_eq!(
            classify("Total deposits and other credits $1,200.00", DEPOSITS),
            LineClass::SectionEnd
        );
        assert_eq!(
            classify("Total deposits and other credits $1,200.00", SectionState::Outside),
            LineClass::Noise
        );
    }

    // ── New entries ───────────────────────────────────────────────────────────

    #[test]
    fn new_entry_lines_yield_date_and_amount() {
        let samples = [
            ("01/10 PAYMENT TO ACME  $50.00", "01/10", "PAYMENT TO ACME", "$50.00"),
            ("1/5 ACH DEPOSIT XYZ 100.00", "1/5", "ACH DEPOSIT XYZ", "100.00"),
            ("12/31 Zelle payment from J DOE Conf# abc123 1,250.75", "12/31", "Zelle payment from J DOE Conf# abc123", "1,250.75"),
            ("   03/02/25   CHECKCARD 0301 STORE #44   -12.34", "03/02/25", "CHECKCARD 0301 STORE #44", "-12.34"),
            ("06/15 X $0.01", "06/15", "X", "$0.01"),
        ];
        for (line, date, desc, amount) in samples {
            match classify(line, WITHDRAWALS) {
                LineClass::NewEntry(entry) => {
                    assert_eq!(entry.date, date, "{line}");
                    assert_eq!(entry.description, desc, "{line}");
                    assert_eq!(entry.amount, amount, "{line}");
                    assert_eq!(entry.balance, None, "{line}");
                }
                other => panic!("{line}: expected NewEntry, got {other:?}"),
            }
        }
    }

    #[test]
    fn trailing_balance_is_split_off() {
        let LineClass::NewEntry(entry) = classify("04/22 Discover E-Payment 8148 15.00 53.70", WITHDRAWALS)
        else {
            panic!("expected entry");
        };
        assert_eq!(entry.description, "Discover E-Payment 8148");
        assert_eq!(entry.amount, "15.00");
        assert_eq!(entry.balance.as_deref(), Some("53.70"));
    }

    #[test]
    fn numbers_inside_description_stay_in_description() {
        let LineClass::NewEntry(entry) = classify("01/09 REFUND 5.00 FEE REVERSAL 12.00", DEPOSITS) else {
            panic!("expected entry");
        };
        assert_eq!(entry.description, "REFUND 5.00 FEE REVERSAL");
        assert_eq!(entry.amount, "12.00");
    }

    // ── Continuations and noise ───────────────────────────────────────────────

    #[test]
    fn continuation_inside_section() {
        assert_eq!(
            classify("  FOR INVOICE #123", WITHDRAWALS),
            LineClass::Continuation(ContinuationShape::Plain)
        );
    }

    #[test]
    fn continuation_with_date_and_amount_is_flagged() {
        assert_eq!(
            classify("ORIG 01/09 REF 45.00 TRACE", DEPOSITS),
            LineClass::Continuation(ContinuationShape::LooksLikeEntry)
        );
    }

    #[test]
    fn lines_outside_sections_are_noise() {
        assert_eq!(
            classify("01/10 PAYMENT TO ACME $50.00", SectionState::Outside),
            LineClass::Noise
        );
        assert_eq!(classify("Your checking account", SectionState::Outside), LineClass::Noise);
    }

    #[test]
    fn boilerplate_is_noise() {
        for line in [
            "Page 2 of 6",
            "Date Description Amount",
            "Date Transaction description Amount",
            "continued on the next page",
            "",
            "    ",
        ] {
            assert_eq!(classify(line, DEPOSITS), LineClass::Noise, "{line:?}");
        }
    }

    #[test]
    fn following_blocks_close_the_section() {
        for line in ["Daily ledger balances", "Account summary", "Ending balance on January 31, 2025"] {
            assert_eq!(classify(line, WITHDRAWALS), LineClass::SectionEnd, "{line}");
        }
    }

    #[test]
    fn section_state_kind() {
        assert_eq!(SectionState::Outside.kind(), None);
        assert_eq!(DEPOSITS.kind(), Some(TransactionType::Deposit));
    }
}
