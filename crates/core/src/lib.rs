pub mod money;
pub mod period;
pub mod transaction;

pub use money::{Money, MoneyError};
pub use period::StatementPeriod;
pub use transaction::{Transaction, TransactionType};
