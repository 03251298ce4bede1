//! Balance mutation rules.
//!
//! Effect of adding a transaction of amount `a`:
//!
//! | Kind       | current | future |
//! |------------|---------|--------|
//! | paid       | -a      | -a     |
//! | received   | +a      | +a     |
//! | payable    | 0       | -a     |
//! | receivable | 0       | +a     |
//!
//! Removing applies the same delta with the opposite sign.

use carihesap_common::{Balances, LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::account::Account;
use crate::transaction::{Transaction, TransactionType};

/// Direction a transaction is applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Transaction joins the account.
    Add,
    /// Transaction leaves the account.
    Remove,
}

/// How settled transactions treat the future balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceRule {
    /// Paid and received move both balances.
    #[default]
    DualBalance,
    /// Paid and received move only the current balance.
    CurrentOnly,
}

impl BalanceRule {
    /// Delta produced by adding `kind` with `amount`.
    pub fn delta(&self, kind: TransactionType, amount: Decimal) -> Balances {
        match (self, kind) {
            (BalanceRule::DualBalance, TransactionType::Paid) => Balances::new(-amount, -amount),
            (BalanceRule::DualBalance, TransactionType::Received) => Balances::new(amount, amount),
            (BalanceRule::CurrentOnly, TransactionType::Paid) => Balances::new(-amount, Decimal::ZERO),
            (BalanceRule::CurrentOnly, TransactionType::Received) => Balances::new(amount, Decimal::ZERO),
            (_, TransactionType::Payable) => Balances::new(Decimal::ZERO, -amount),
            (_, TransactionType::Receivable) => Balances::new(Decimal::ZERO, amount),
        }
    }

    /// Signed delta of a transaction.
    pub fn effect(&self, transaction: &Transaction, sign: Sign) -> Balances {
        let delta = self.delta(transaction.kind, transaction.amount);
        match sign {
            Sign::Add => delta,
            Sign::Remove => -delta,
        }
    }

    /// Apply a transaction to an account's balances in place.
    ///
    /// Fails without touching the account if either balance would leave
    /// the decimal range.
    pub fn apply(&self, account: &mut Account, transaction: &Transaction, sign: Sign) -> Result<()> {
        let next = account
            .balances()
            .checked_add(self.effect(transaction, sign))
            .ok_or_else(|| LedgerError::invalid_input("amount", "balance out of range"))?;
        account.current_balance = next.current;
        account.future_balance = next.future;
        Ok(())
    }

    /// Balances implied by an opening value and a transaction history.
    ///
    /// `None` if the running total leaves the decimal range.
    pub fn replay<'a>(
        &self,
        opening: Decimal,
        transactions: impl IntoIterator<Item = &'a Transaction>,
    ) -> Option<Balances> {
        transactions
            .into_iter()
            .try_fold(Balances::opening(opening), |acc, tx| {
                acc.checked_add(self.effect(tx, Sign::Add))
            })
    }
}

impl fmt::Display for BalanceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceRule::DualBalance => f.write_str("dual_balance"),
            BalanceRule::CurrentOnly => f.write_str("current_only"),
        }
    }
}

impl FromStr for BalanceRule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "dual_balance" | "dual" => Ok(BalanceRule::DualBalance),
            "current_only" | "current" => Ok(BalanceRule::CurrentOnly),
            other => Err(format!("Unknown balance rule: {}", other)),
        }
    }
}

/// Apply a transaction under the dual-balance rule, returning the new account.
///
/// Only the balances change; list membership is the caller's business.
pub fn apply_transaction(account: &Account, transaction: &Transaction, sign: Sign) -> Result<Account> {
    let mut next = account.clone();
    BalanceRule::DualBalance.apply(&mut next, transaction, sign)?;
    Ok(next)
}
