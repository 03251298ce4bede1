//! Command handlers.
//!
//! Each handler runs one ledger operation and renders its result.

use anyhow::{anyhow, bail, Context};
use carihesap_common::{Email, TransactionId};
use carihesap_ledger::{
    input::{parse_date, validate_email},
    DateRange, LedgerStore, NewAccount, NewTransaction, TransactionFilter, TransactionType,
};
use carihesap_store::KeyValueStore;
use tracing::info;

use crate::output::{self, Format};

/// Raw text for `account create`.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub name: String,
    pub email: String,
    pub balance: Option<String>,
}

/// Raw text for `tx add`.
#[derive(Debug, Clone)]
pub struct AddTransaction {
    pub email: String,
    pub description: String,
    pub amount: String,
    pub kind: String,
    pub date: Option<String>,
}

/// Raw text for `tx list` filters.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub kind: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl ListFilter {
    /// Turn the raw flags into a transaction filter.
    ///
    /// A single date bound selects that day alone.
    pub fn build(&self) -> anyhow::Result<TransactionFilter> {
        let mut filter = TransactionFilter::new();

        if let Some(kind) = &self.kind {
            let kind: TransactionType = kind.parse().map_err(|e: String| anyhow!(e))?;
            filter = filter.with_type(kind);
        }

        let from = self.from.as_deref().map(parse_date).transpose()?;
        let to = self.to.as_deref().map(parse_date).transpose()?;
        let range = match (from, to) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            (Some(day), None) | (None, Some(day)) => Some(DateRange::day(day)),
            (None, None) => None,
        };
        if let Some(range) = range {
            filter = filter.with_date_range(range);
        }

        Ok(filter)
    }
}

fn email(text: &str) -> anyhow::Result<Email> {
    Ok(validate_email(text)?)
}

pub fn create_account<S: KeyValueStore>(
    ledger: &mut LedgerStore<S>,
    args: &CreateAccount,
    format: Format,
) -> anyhow::Result<String> {
    let input = NewAccount::parse(&args.name, &args.email, args.balance.as_deref())?;
    let account = ledger.create_account(input)?;
    info!(email = %account.email, "Account created");
    output::account(account, format)
}

pub fn list_accounts<S: KeyValueStore>(
    ledger: &LedgerStore<S>,
    format: Format,
) -> anyhow::Result<String> {
    output::accounts(&ledger.summaries(), format)
}

pub fn show_account<S: KeyValueStore>(
    ledger: &LedgerStore<S>,
    address: &str,
    format: Format,
) -> anyhow::Result<String> {
    let account = ledger.get(&email(address)?)?;
    output::account(account, format)
}

pub fn delete_account<S: KeyValueStore>(
    ledger: &mut LedgerStore<S>,
    address: &str,
    format: Format,
) -> anyhow::Result<String> {
    let removed = ledger.delete_account(&email(address)?)?;
    match format {
        Format::Json => output::account(&removed, format),
        Format::Text => Ok(format!(
            "Deleted {} <{}> with {} transaction(s).",
            removed.name,
            removed.email,
            removed.transactions.len()
        )),
    }
}

pub fn add_transaction<S: KeyValueStore>(
    ledger: &mut LedgerStore<S>,
    args: &AddTransaction,
    format: Format,
) -> anyhow::Result<String> {
    let address = email(&args.email)?;
    let input = NewTransaction::parse(
        &args.description,
        &args.amount,
        &args.kind,
        args.date.as_deref(),
    )?;
    let tx = ledger.add_transaction(&address, input)?;
    output::transaction(&tx, format)
}

pub fn remove_transaction<S: KeyValueStore>(
    ledger: &mut LedgerStore<S>,
    address: &str,
    id: &str,
    format: Format,
) -> anyhow::Result<String> {
    let address = email(address)?;
    let id = TransactionId::parse(id.trim())
        .with_context(|| format!("{:?} is not a transaction id", id))?;
    let tx = ledger.remove_transaction(&address, id)?;
    output::transaction(&tx, format)
}

pub fn list_transactions<S: KeyValueStore>(
    ledger: &LedgerStore<S>,
    address: &str,
    filter: &ListFilter,
    format: Format,
) -> anyhow::Result<String> {
    let filter = filter.build()?;
    let view = ledger.transactions(&email(address)?, &filter)?;
    output::transactions(&view, format)
}

/// Check every account; fails when any balance disagrees with its history.
pub fn verify<S: KeyValueStore>(ledger: &LedgerStore<S>) -> anyhow::Result<String> {
    let found = ledger.verify();
    let report = output::mismatches(&found);
    if !found.is_empty() {
        bail!("{}", report);
    }
    Ok(report)
}
