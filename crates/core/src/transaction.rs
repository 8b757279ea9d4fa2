use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Which statement section a transaction was listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "Deposit"),
            TransactionType::Withdrawal => write!(f, "Withdrawal"),
        }
    }
}

impl TransactionType {
    /// Apply this type's sign to an unsigned magnitude.
    pub fn signed(self, magnitude: Money) -> Money {
        match self {
            TransactionType::Deposit => magnitude.abs(),
            TransactionType::Withdrawal => -magnitude.abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub kind: TransactionType,
    pub description: String,
    /// Positive for deposits, negative for withdrawals.
    pub amount: Money,
    pub raw_line: String,
    /// Originating statement; only set on aggregated records.
    pub source: Option<String>,
}

impl Transaction {
    /// The sign of `amount` comes from `kind` alone; any sign on `magnitude` is ignored.
    pub fn new(
        date: NaiveDate,
        kind: TransactionType,
        description: impl Into<String>,
        magnitude: Money,
        raw_line: impl Into<String>,
    ) -> Self {
        Transaction {
            date,
            kind,
            description: description.into(),
            amount: kind.signed(magnitude),
            raw_line: raw_line.into(),
            source: None,
        }
    }

    pub fn magnitude(&self) -> Money {
        self.amount.abs()
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
