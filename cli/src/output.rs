//! Rendering of ledger values for the terminal.

use carihesap_common::format_amount;
use carihesap_ledger::{Account, AccountSummary, BalanceMismatch, FilteredView, Transaction};
use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// Account list.
pub fn accounts(rows: &[AccountSummary], format: Format) -> anyhow::Result<String> {
    if format == Format::Json {
        return json(&rows);
    }
    if rows.is_empty() {
        return Ok("No accounts.".to_string());
    }

    let lines: Vec<String> = rows
        .iter()
        .map(|row| {
            format!(
                "{:<24} {:<28} current {:>16}  future {:>16}  ({} tx)",
                row.name,
                row.email,
                format_amount(row.current_balance),
                format_amount(row.future_balance),
                row.transaction_count
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

/// One account with its transactions.
pub fn account(account: &Account, format: Format) -> anyhow::Result<String> {
    if format == Format::Json {
        return json(account);
    }

    let mut out = format!(
        "{} <{}>\nCurrent: {}\nFuture:  {}",
        account.name,
        account.email,
        format_amount(account.current_balance),
        format_amount(account.future_balance)
    );
    for tx in &account.transactions {
        out.push('\n');
        out.push_str(&transaction_line(tx));
    }
    Ok(out)
}

/// A single transaction.
pub fn transaction(tx: &Transaction, format: Format) -> anyhow::Result<String> {
    match format {
        Format::Json => json(tx),
        Format::Text => Ok(transaction_line(tx)),
    }
}

/// A filtered transaction list.
pub fn transactions(view: &FilteredView<'_>, format: Format) -> anyhow::Result<String> {
    if format == Format::Json {
        return json(&view.to_vec());
    }
    if view.is_empty() {
        return Ok(if view.is_filter_active() {
            "No transactions match the filter.".to_string()
        } else {
            "No transactions.".to_string()
        });
    }

    Ok(view.iter().map(transaction_line).collect::<Vec<_>>().join("\n"))
}

/// Verification result.
pub fn mismatches(found: &[BalanceMismatch]) -> String {
    if found.is_empty() {
        return "All balances match their history.".to_string();
    }

    found
        .iter()
        .map(|m| match &m.expected {
            Some(expected) => format!("{}: stored {} but history gives {}", m.email, m.stored, expected),
            None => format!("{}: stored {} but history is out of range", m.email, m.stored),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn transaction_line(tx: &Transaction) -> String {
    format!(
        "  {}  {}  {:<10} {:>16}  {}",
        tx.id,
        tx.date.format("%Y-%m-%d %H:%M"),
        tx.kind.label(),
        format_amount(tx.amount),
        tx.description
    )
}

fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
