//! Snapshot encoding for persisted accounts.
//!
//! The account collection is stored as a versioned JSON envelope that
//! also records the balance rule the stored balances were computed
//! under. The bare JSON array written by older builds is still accepted
//! on read.

use carihesap_common::{LedgerError, Result};
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::balance::BalanceRule;

/// Current envelope version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    balance_rule: BalanceRule,
    accounts: &'a [Account],
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredAccounts {
    /// `version` is checked on the raw value before this is parsed.
    Envelope {
        #[serde(default)]
        balance_rule: Option<BalanceRule>,
        accounts: Vec<Account>,
    },
    Bare(Vec<Account>),
}

/// A decoded account collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCollection {
    pub accounts: Vec<Account>,
    /// Rule the balances were computed under. Bare arrays and envelopes
    /// written before the rule was recorded carry none.
    pub balance_rule: Option<BalanceRule>,
}

/// Encode a single account.
pub fn encode_account(account: &Account) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(account)?)
}

/// Decode a single account.
pub fn decode_account(bytes: &[u8]) -> Result<Account> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encode the full account collection along with the rule its balances follow.
pub fn encode_accounts(accounts: &[Account], balance_rule: BalanceRule) -> Result<Vec<u8>> {
    let envelope = EnvelopeRef {
        version: SNAPSHOT_VERSION,
        balance_rule,
        accounts,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Decode the full account collection.
///
/// An envelope from a newer format version fails with
/// [`LedgerError::UnsupportedVersion`] before its contents are looked at.
pub fn decode_accounts(bytes: &[u8]) -> Result<StoredCollection> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;

    if let Some(found) = value.get("version").and_then(serde_json::Value::as_u64) {
        if found > u64::from(SNAPSHOT_VERSION) {
            return Err(LedgerError::UnsupportedVersion {
                found,
                supported: SNAPSHOT_VERSION,
            });
        }
    }

    Ok(match serde_json::from_value::<StoredAccounts>(value)? {
        StoredAccounts::Envelope {
            balance_rule,
            accounts,
        } => StoredCollection {
            accounts,
            balance_rule,
        },
        StoredAccounts::Bare(accounts) => StoredCollection {
            accounts,
            balance_rule: None,
        },
    })
}
