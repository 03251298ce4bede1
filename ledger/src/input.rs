//! Validation of raw user input.
//!
//! The front end hands over text exactly as typed; everything here turns
//! it into values the ledger can trust, or a `LedgerError::InvalidInput`.

use carihesap_common::{start_of_day, Email, LedgerError, Result, Timestamp};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::transaction::{Transaction, TransactionType};

const MAX_NAME_LEN: usize = 120;
const MAX_DESCRIPTION_LEN: usize = 500;

/// Validated input for a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: Email,
    pub opening_balance: Decimal,
}

impl NewAccount {
    /// Validate already-typed values.
    pub fn new(name: &str, email: &str, opening_balance: Decimal) -> Result<Self> {
        Ok(Self {
            name: validate_name(name)?,
            email: validate_email(email)?,
            opening_balance,
        })
    }

    /// Validate raw text; a blank balance means zero.
    pub fn parse(name: &str, email: &str, balance: Option<&str>) -> Result<Self> {
        let opening_balance = match balance.map(str::trim) {
            None | Some("") => Decimal::ZERO,
            Some(text) => parse_balance(text)?,
        };
        Self::new(name, email, opening_balance)
    }
}

/// Validated input for a new transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: Decimal,
    pub kind: TransactionType,
    /// Defaults to the time of insertion.
    pub date: Option<Timestamp>,
}

impl NewTransaction {
    /// Validate already-typed values.
    pub fn new(description: &str, amount: Decimal, kind: TransactionType) -> Result<Self> {
        Ok(Self {
            description: validate_description(description)?,
            amount: check_amount(amount)?,
            kind,
            date: None,
        })
    }

    /// Validate raw text.
    pub fn parse(description: &str, amount: &str, kind: &str, date: Option<&str>) -> Result<Self> {
        let kind = TransactionType::from_str(kind)
            .map_err(|e| LedgerError::invalid_input("type", e))?;
        let mut input = Self::new(description, parse_amount(amount)?, kind)?;
        if let Some(text) = date.map(str::trim).filter(|t| !t.is_empty()) {
            input.date = Some(parse_timestamp(text)?);
        }
        Ok(input)
    }

    /// Set the date.
    pub fn on(mut self, date: Timestamp) -> Self {
        self.date = Some(date);
        self
    }

    /// Build the transaction, stamping the date now if none was given.
    pub fn into_transaction(self) -> Transaction {
        let tx = Transaction::new(self.description, self.amount, self.kind);
        match self.date {
            Some(date) => tx.with_date(date),
            None => tx,
        }
    }
}

/// Non-empty, trimmed account name.
pub fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::invalid_input("name", "cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(LedgerError::invalid_input(
            "name",
            format!("longer than {} characters", MAX_NAME_LEN),
        ));
    }
    Ok(name.to_string())
}

/// Normalized, well-formed email.
pub fn validate_email(email: &str) -> Result<Email> {
    let email = Email::new(email);
    if !email.is_valid() {
        return Err(LedgerError::invalid_input(
            "email",
            format!("{:?} is not an email address", email.as_str()),
        ));
    }
    Ok(email)
}

/// Non-empty, trimmed description.
pub fn validate_description(description: &str) -> Result<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(LedgerError::invalid_input("description", "cannot be empty"));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(LedgerError::invalid_input(
            "description",
            format!("longer than {} characters", MAX_DESCRIPTION_LEN),
        ));
    }
    Ok(description.to_string())
}

/// Parse a transaction amount. Must be greater than zero.
pub fn parse_amount(text: &str) -> Result<Decimal> {
    check_amount(parse_decimal("amount", text)?)
}

/// Parse an opening balance. May be negative.
pub fn parse_balance(text: &str) -> Result<Decimal> {
    parse_decimal("balance", text)
}

fn check_amount(amount: Decimal) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_input("amount", "must be greater than zero"));
    }
    Ok(amount)
}

/// Decimal text with either `.` or `,` as the separator.
fn parse_decimal(field: &str, text: &str) -> Result<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LedgerError::invalid_input(field, "cannot be empty"));
    }
    if text.contains('.') && text.contains(',') {
        return Err(LedgerError::invalid_input(
            field,
            format!("{:?} mixes decimal separators", text),
        ));
    }
    let normalized = text.replace(',', ".");
    Decimal::from_str(&normalized)
        .map_err(|_| LedgerError::invalid_input(field, format!("{:?} is not a number", text)))
}

/// Parse a calendar day: `2025-05-05` or `05.05.2025`.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d.%m.%Y"))
        .map_err(|_| LedgerError::invalid_input("date", format!("{:?} is not a date", text)))
}

/// Parse an RFC 3339 timestamp, or a bare day taken as its midnight.
pub fn parse_timestamp(text: &str) -> Result<Timestamp> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.with_timezone(&Utc));
    }
    parse_date(text).map(start_of_day)
}
