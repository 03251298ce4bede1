//! Transaction types.

use carihesap_common::{now, Timestamp, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of transaction. The kind alone decides which balances move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Already paid out.
    Paid,
    /// Already received.
    Received,
    /// To be paid later.
    Payable,
    /// To be received later.
    Receivable,
}

impl TransactionType {
    /// Every kind, in display order.
    pub const ALL: [TransactionType; 4] = [
        TransactionType::Receivable,
        TransactionType::Payable,
        TransactionType::Received,
        TransactionType::Paid,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Paid => "Paid",
            TransactionType::Received => "Received",
            TransactionType::Payable => "Payable",
            TransactionType::Receivable => "Receivable",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    /// Accepts the English labels and the Turkish ones the app used
    /// (Ödendi, Alındı, Verilecek, Alınacak), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paid" | "ödendi" | "odendi" => Ok(TransactionType::Paid),
            "received" | "alındı" | "alindi" => Ok(TransactionType::Received),
            "payable" | "verilecek" => Ok(TransactionType::Payable),
            "receivable" | "alınacak" | "alinacak" => Ok(TransactionType::Receivable),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

/// A dated entry on one account.
///
/// Kind and amount never change after creation, so removing a
/// transaction can always undo exactly what adding it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID.
    pub id: TransactionId,
    /// Free-text description.
    pub description: String,
    /// Non-negative amount; direction comes from the kind.
    pub amount: Decimal,
    /// Transaction kind.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// When the transaction happened.
    pub date: Timestamp,
}

impl Transaction {
    /// Create a transaction dated now.
    pub fn new(description: impl Into<String>, amount: Decimal, kind: TransactionType) -> Self {
        Self {
            id: TransactionId::new(),
            description: description.into(),
            amount,
            kind,
            date: now(),
        }
    }

    /// Override the date.
    pub fn with_date(mut self, date: Timestamp) -> Self {
        self.date = date;
        self
    }
}
