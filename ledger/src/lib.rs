//! CariHesap Ledger
//!
//! Accounts with a current and a future balance, the transactions that
//! move them, and the store that keeps both persisted together.

pub mod account;
pub mod balance;
pub mod config;
pub mod engine;
pub mod filter;
pub mod input;
pub mod snapshot;
pub mod transaction;

pub use account::{Account, AccountSummary};
pub use balance::{apply_transaction, BalanceRule, Sign};
pub use config::LedgerConfig;
pub use engine::{BalanceMismatch, LedgerStore};
pub use filter::{filter, DateRange, FilteredView, Predicate, TransactionFilter};
pub use input::{NewAccount, NewTransaction};
pub use transaction::{Transaction, TransactionType};
