//! Account definitions for the ledger.

use carihesap_common::{now, AccountId, Balances, Email, Timestamp, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::balance::BalanceRule;
use crate::transaction::Transaction;

/// A ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Email, unique among accounts.
    pub email: Email,
    /// Balance entered when the account was opened.
    #[serde(default)]
    pub opening_balance: Decimal,
    /// Settled balance.
    pub current_balance: Decimal,
    /// Expected balance once pending items settle.
    pub future_balance: Decimal,
    /// Transactions, most recent first.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// When the account was created.
    pub created_at: Timestamp,
}

impl Account {
    /// Create a new account. Both balances start at the opening balance.
    pub fn new(name: impl Into<String>, email: Email, opening_balance: Decimal) -> Self {
        Self {
            id: AccountId::new(),
            name: name.into(),
            email,
            opening_balance,
            current_balance: opening_balance,
            future_balance: opening_balance,
            transactions: Vec::new(),
            created_at: now(),
        }
    }

    /// Both balances as a pair.
    pub fn balances(&self) -> Balances {
        Balances::new(self.current_balance, self.future_balance)
    }

    /// Find a transaction by id.
    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    /// Balances the history implies under `rule`, or `None` if the
    /// history sums past the decimal range.
    pub fn expected_balances(&self, rule: BalanceRule) -> Option<Balances> {
        rule.replay(self.opening_balance, &self.transactions)
    }

    /// Check the stored balances against the history.
    pub fn is_consistent(&self, rule: BalanceRule) -> bool {
        self.expected_balances(rule) == Some(self.balances())
    }

    /// Compact listing view.
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            current_balance: self.current_balance,
            future_balance: self.future_balance,
            transaction_count: self.transactions.len(),
        }
    }

    /// Insert at the head of the list.
    pub(crate) fn push_transaction(&mut self, transaction: Transaction) {
        self.transactions.insert(0, transaction);
    }

    /// Take a transaction out of the list.
    pub(crate) fn take_transaction(&mut self, id: TransactionId) -> Option<Transaction> {
        let index = self.transactions.iter().position(|tx| tx.id == id)?;
        Some(self.transactions.remove(index))
    }
}

/// One row of the account list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: AccountId,
    pub name: String,
    pub email: Email,
    pub current_balance: Decimal,
    pub future_balance: Decimal,
    pub transaction_count: usize,
}
