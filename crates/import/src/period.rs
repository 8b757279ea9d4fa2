use chrono::NaiveDate;
use regex::Captures;
use tally_core::StatementPeriod;

use crate::patterns::{re_beginning_balance, re_ending_balance, re_period_for_range, re_period_numeric};

fn named_date(month: &str, day: &str, year: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{month} {day} {year}"), "%B %d %Y").ok()
}

fn named_date_at(caps: &Captures<'_>, first: usize) -> Option<NaiveDate> {
    named_date(
        caps.get(first)?.as_str(),
        caps.get(first + 1)?.as_str(),
        caps.get(first + 2)?.as_str(),
    )
}

/// Find the statement period printed in the header, if any.
///
/// Recognises "for January 1, 2025 to January 31, 2025", "Statement Period:
/// 01/01/2025 - 01/31/2025", and a "Beginning balance on …" / "Ending balance
/// on …" pair.
pub fn detect_period(lines: &[String]) -> Option<StatementPeriod> {
    let mut beginning = None;
    let mut ending = None;

    for line in lines {
        if let Some(caps) = re_period_for_range().captures(line) {
            if let (Some(start), Some(end)) = (named_date_at(&caps, 1), named_date_at(&caps, 4)) {
                return Some(StatementPeriod::new(start, end));
            }
        }

        if let Some(caps) = re_period_numeric().captures(line) {
            let start = NaiveDate::parse_from_str(&caps[1], "%m/%d/%Y").ok();
            let end = NaiveDate::parse_from_str(&caps[2], "%m/%d/%Y").ok();
            if let (Some(start), Some(end)) = (start, end) {
                return Some(StatementPeriod::new(start, end));
            }
        }

        if beginning.is_none() {
            beginning = re_beginning_balance()
                .captures(line)
                .and_then(|caps| named_date_at(&caps, 1));
        }
        if ending.is_none() {
            ending = re_ending_balance()
                .captures(line)
                .and_then(|caps| named_date_at(&caps, 1));
        }
    }

    match (beginning, ending) {
        (Some(start), Some(end)) => Some(StatementPeriod::new(start, end)),
        _ => None,
    }
}
