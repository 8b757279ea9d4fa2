use chrono::{Datelike, NaiveDate};

use crate::patterns::is_date_token;

/// A date as printed on a statement. Most rows omit the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateToken {
    pub month: u32,
    pub day: u32,
    pub year: Option<i32>,
}

impl DateToken {
    /// Parses `MM/DD`, `MM/DD/YY`, `MM/DD/YYYY` (either separator) or ISO `YYYY-MM-DD`.
    /// Rejects month or day values that can never form a date.
    pub fn parse(s: &str) -> Option<DateToken> {
        let s = s.trim();
        if !is_date_token(s) {
            return None;
        }

        if s.len() == 10 && s.as_bytes()[4] == b'-' {
            let iso = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
            return Some(DateToken {
                month: iso.month(),
                day: iso.day(),
                year: Some(iso.year()),
            });
        }

        let mut parts = s.split(['/', '-']);
        let month: u32 = parts.next()?.parse().ok()?;
        let day: u32 = parts.next()?.parse().ok()?;
        let year = match parts.next() {
            Some(y) if y.len() == 2 => Some(2000 + y.parse::<i32>().ok()?),
            Some(y) => Some(y.parse::<i32>().ok()?),
            None => None,
        };

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        let token = DateToken { month, day, year };
        if token.year.is_some() && token.to_date().is_none() {
            return None;
        }
        Some(token)
    }

    /// Only succeeds when the token carried its own year.
    pub fn to_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month, self.day)
    }

    pub fn with_year(self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}
