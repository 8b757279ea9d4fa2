use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The date range a statement covers. Used to anchor month/day tokens to a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for StatementPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl StatementPeriod {
    /// Builds a period, swapping the bounds if they were given in reverse.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            StatementPeriod { start: end, end: start }
        } else {
            StatementPeriod { start, end }
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Year a bare month belongs to.
    ///
    /// A December–January statement puts months earlier than the start month
    /// in the end year.
    pub fn year_for(self, month: u32) -> i32 {
        if self.start.year() != self.end.year() && month < self.start.month() {
            self.end.year()
        } else {
            self.start.year()
        }
    }

    pub fn resolve(self, month: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year_for(month), month, day)
    }
}
