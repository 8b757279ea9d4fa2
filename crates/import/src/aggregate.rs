use serde::Serialize;
use tally_core::{Money, Transaction, TransactionType};

/// One statement's normalized transactions, keyed by its source name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementTransactions {
    pub source: String,
    pub transactions: Vec<Transaction>,
}

impl StatementTransactions {
    pub fn new(source: impl Into<String>, transactions: Vec<Transaction>) -> Self {
        Self {
            source: source.into(),
            transactions,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    /// Per statement, in processing order, each sorted by date.
    pub statements: Vec<StatementTransactions>,
    /// Every record tagged with its source, sorted by date.
    pub combined: Vec<Transaction>,
}

/// Stable: same-day records keep their original order.
pub fn sort_by_date(transactions: &mut [Transaction]) {
    transactions.sort_by_key(|tx| tx.date);
}

/// Merge statements without cross-statement dedup; a transfer that shows up
/// on two accounts is kept once per statement.
pub fn aggregate(statements: Vec<StatementTransactions>) -> Aggregate {
    let mut sorted = Vec::with_capacity(statements.len());
    let mut combined = Vec::new();

    for mut statement in statements {
        sort_by_date(&mut statement.transactions);
        combined.extend(
            statement
                .transactions
                .iter()
                .cloned()
                .map(|tx| tx.with_source(statement.source.clone())),
        );
        sorted.push(statement);
    }
    sort_by_date(&mut combined);

    Aggregate {
        statements: sorted,
        combined,
    }
}

impl Aggregate {
    pub fn statement(&self, source: &str) -> Option<&[Transaction]> {
        self.statements
            .iter()
            .find(|s| s.source == source)
            .map(|s| s.transactions.as_slice())
    }

    fn total_of(&self, kind: TransactionType) -> Money {
        self.combined
            .iter()
            .filter(|tx| tx.kind == kind)
            .map(|tx| tx.amount)
            .sum()
    }

    pub fn deposit_total(&self) -> Money {
        self.total_of(TransactionType::Deposit)
    }

    /// Negative, as stored.
    pub fn withdrawal_total(&self) -> Money {
        self.total_of(TransactionType::Withdrawal)
    }

    pub fn net_total(&self) -> Money {
        self.combined.iter().map(|tx| tx.amount).sum()
    }
}
