//! The ledger store: owns every account and keeps storage in step.

use carihesap_common::{Balances, Email, LedgerError, Result, TransactionId};
use carihesap_store::KeyValueStore;
use tracing::{debug, info, instrument, warn};

use crate::account::{Account, AccountSummary};
use crate::balance::Sign;
use crate::config::LedgerConfig;
use crate::filter::{FilteredView, TransactionFilter};
use crate::input::{NewAccount, NewTransaction};
use crate::snapshot::{decode_accounts, encode_account, encode_accounts};
use crate::transaction::Transaction;

/// An account whose stored balances disagree with its history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceMismatch {
    pub email: Email,
    pub stored: Balances,
    /// `None` when replaying the history leaves the decimal range.
    pub expected: Option<Balances>,
}

/// In-memory account collection backed by a key-value store.
///
/// Every mutation is prepared on a copy, written to the backend as one
/// blob, and only then made visible. A failed write leaves both memory
/// and storage as they were.
pub struct LedgerStore<S> {
    backend: S,
    config: LedgerConfig,
    accounts: Vec<Account>,
}

impl<S: KeyValueStore> LedgerStore<S> {
    /// Open the store, loading whatever the backend holds.
    ///
    /// A missing or unparsable collection blob yields an empty ledger. A
    /// blob from a newer format version, or one recorded under a different
    /// balance rule, is refused and left untouched.
    #[instrument(skip(backend, config), fields(backend = backend.name()))]
    pub fn open(backend: S, config: LedgerConfig) -> Result<Self> {
        config.validate().map_err(LedgerError::Configuration)?;

        let accounts = load_accounts(&backend, &config)?;
        info!(accounts = accounts.len(), "Ledger opened");

        Ok(Self {
            backend,
            config,
            accounts,
        })
    }

    /// Discard in-memory state and read the backend again.
    pub fn reload(&mut self) -> Result<()> {
        self.accounts = load_accounts(&self.backend, &self.config)?;
        Ok(())
    }

    /// The backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Mutable access to the backend.
    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Consume the store, returning the backend.
    pub fn into_backend(self) -> S {
        self.backend
    }

    /// All accounts, in creation order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Listing rows for every account.
    pub fn summaries(&self) -> Vec<AccountSummary> {
        self.accounts.iter().map(Account::summary).collect()
    }

    /// Look up an account by email.
    pub fn account(&self, email: &Email) -> Option<&Account> {
        self.accounts.iter().find(|a| &a.email == email)
    }

    /// Look up an account by email, failing if absent.
    pub fn get(&self, email: &Email) -> Result<&Account> {
        self.account(email)
            .ok_or_else(|| LedgerError::AccountNotFound(email.clone()))
    }

    /// Create an account. Emails must be unique.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub fn create_account(&mut self, input: NewAccount) -> Result<&Account> {
        if self.account(&input.email).is_some() {
            return Err(LedgerError::DuplicateEmail(input.email));
        }

        let account = Account::new(input.name, input.email, input.opening_balance);
        let email = account.email.clone();
        info!(
            account_id = %account.id,
            opening_balance = %account.opening_balance,
            "Creating account"
        );

        let mut next = self.accounts.clone();
        next.push(account);
        self.commit(next, &email)?;

        self.get(&email)
    }

    /// Delete an account with all of its transactions.
    #[instrument(skip(self, email), fields(email = %email))]
    pub fn delete_account(&mut self, email: &Email) -> Result<Account> {
        let index = self.position(email)?;

        let mut next = self.accounts.clone();
        let removed = next.remove(index);
        info!(
            account_id = %removed.id,
            transactions = removed.transactions.len(),
            "Deleting account"
        );

        self.commit(next, email)?;
        Ok(removed)
    }

    /// Add a transaction at the head of an account's list and apply its effect.
    #[instrument(skip(self, email, input), fields(email = %email, kind = %input.kind))]
    pub fn add_transaction(&mut self, email: &Email, input: NewTransaction) -> Result<Transaction> {
        let index = self.position(email)?;
        let transaction = input.into_transaction();

        let mut next = self.accounts.clone();
        let account = &mut next[index];
        self.config
            .balance_rule
            .apply(account, &transaction, Sign::Add)?;
        account.push_transaction(transaction.clone());

        info!(
            transaction_id = %transaction.id,
            amount = %transaction.amount,
            current = %account.current_balance,
            future = %account.future_balance,
            "Adding transaction"
        );

        self.commit(next, email)?;
        Ok(transaction)
    }

    /// Remove a transaction and undo its effect.
    #[instrument(skip(self, email, id), fields(email = %email, transaction_id = %id))]
    pub fn remove_transaction(&mut self, email: &Email, id: TransactionId) -> Result<Transaction> {
        let index = self.position(email)?;

        let mut next = self.accounts.clone();
        let account = &mut next[index];
        let transaction = account
            .take_transaction(id)
            .ok_or(LedgerError::TransactionNotFound(id))?;
        self.config
            .balance_rule
            .apply(account, &transaction, Sign::Remove)?;

        info!(
            amount = %transaction.amount,
            kind = %transaction.kind,
            current = %account.current_balance,
            future = %account.future_balance,
            "Removing transaction"
        );

        self.commit(next, email)?;
        Ok(transaction)
    }

    /// Filtered view of one account's transactions.
    pub fn transactions(&self, email: &Email, filter: &TransactionFilter) -> Result<FilteredView<'_>> {
        let account = self.get(email)?;
        Ok(filter.apply(&account.transactions))
    }

    /// Accounts whose balances do not match their history.
    pub fn verify(&self) -> Vec<BalanceMismatch> {
        let rule = self.config.balance_rule;
        self.accounts
            .iter()
            .filter_map(|account| {
                let expected = account.expected_balances(rule);
                let stored = account.balances();
                (expected != Some(stored)).then(|| BalanceMismatch {
                    email: account.email.clone(),
                    stored,
                    expected,
                })
            })
            .collect()
    }

    fn position(&self, email: &Email) -> Result<usize> {
        self.accounts
            .iter()
            .position(|a| &a.email == email)
            .ok_or_else(|| LedgerError::AccountNotFound(email.clone()))
    }

    /// Persist `next` and make it current.
    fn commit(&mut self, next: Vec<Account>, touched: &Email) -> Result<()> {
        let bytes = encode_accounts(&next, self.config.balance_rule)?;
        self.backend.save(&self.config.accounts_key, &bytes)?;
        self.accounts = next;
        debug!(key = %self.config.accounts_key, bytes = bytes.len(), "Accounts saved");

        if self.config.write_account_snapshots {
            self.sync_snapshot(touched);
        }
        Ok(())
    }

    /// Bring the derived per-account blob in line with the collection.
    ///
    /// Failures are logged only: the collection already holds the truth.
    fn sync_snapshot(&mut self, email: &Email) {
        let key = email.storage_key();
        let result = match self.accounts.iter().find(|a| &a.email == email) {
            Some(account) => match encode_account(account) {
                Ok(bytes) => self.backend.save(&key, &bytes).map_err(LedgerError::from),
                Err(e) => Err(e),
            },
            None => self.backend.remove(&key).map_err(LedgerError::from),
        };

        if let Err(e) = result {
            warn!(key = %key, error = %e, "Account snapshot out of date");
        }
    }
}

fn load_accounts<S: KeyValueStore>(backend: &S, config: &LedgerConfig) -> Result<Vec<Account>> {
    let key = config.accounts_key.as_str();
    let Some(bytes) = backend.load(key)? else {
        debug!(key, "No stored accounts");
        return Ok(Vec::new());
    };

    let stored = match decode_accounts(&bytes) {
        Ok(stored) => stored,
        Err(e @ LedgerError::UnsupportedVersion { .. }) => return Err(e),
        Err(e) => {
            warn!(key, error = %e, "Stored accounts unreadable, starting empty");
            return Ok(Vec::new());
        }
    };

    match stored.balance_rule {
        Some(rule) if rule != config.balance_rule => {
            return Err(LedgerError::Configuration(format!(
                "stored accounts were recorded under balance rule {}, configured rule is {}",
                rule, config.balance_rule
            )));
        }
        Some(_) => {}
        None => debug!(key, "Stored accounts carry no balance rule"),
    }
    let accounts = stored.accounts;

    let mut seen = std::collections::HashSet::new();
    for account in &accounts {
        if !seen.insert(&account.email) {
            warn!(email = %account.email, "Duplicate email in stored accounts; lookups use the first");
        }
    }

    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::BalanceRule;
    use crate::filter::DateRange;
    use crate::snapshot::decode_account;
    use crate::transaction::TransactionType;
    use carihesap_store::MemoryStore;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn open() -> LedgerStore<MemoryStore> {
        LedgerStore::open(MemoryStore::new(), LedgerConfig::default()).unwrap()
    }

    fn email(s: &str) -> Email {
        Email::new(s)
    }

    fn new_account(ledger: &mut LedgerStore<MemoryStore>, mail: &str, balance: rust_decimal::Decimal) {
        ledger
            .create_account(NewAccount::new("Test", mail, balance).unwrap())
            .unwrap();
    }

    fn tx(kind: TransactionType, amount: rust_decimal::Decimal) -> NewTransaction {
        NewTransaction::new(kind.label(), amount, kind).unwrap()
    }

    #[test]
    fn test_create_and_lookup() {
        let mut ledger = open();
        new_account(&mut ledger, "a@x.com", dec!(100));

        let account = ledger.get(&email("A@x.com")).unwrap();
        assert_eq!(account.balances(), Balances::opening(dec!(100)));
        assert_eq!(ledger.summaries().len(), 1);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let mut ledger = open();
        new_account(&mut ledger, "a@x.com", dec!(0));

        let err = ledger
            .create_account(NewAccount::new("Other", "A@X.COM", dec!(5)).unwrap())
            .unwrap_err();
        assert_eq!(err, LedgerError::DuplicateEmail(email("a@x.com")));
        assert_eq!(ledger.accounts().len(), 1);
    }

    #[test]
    fn test_unknown_account() {
        let mut ledger = open();
        let err = ledger
            .add_transaction(&email("ghost@x.com"), tx(TransactionType::Paid, dec!(1)))
            .unwrap_err();
        assert_eq!(err.error_code(), "ACCOUNT_NOT_FOUND");
        assert!(ledger.delete_account(&email("ghost@x.com")).is_err());
    }

    #[test]
    fn test_documented_scenario() {
        let mut ledger = open();
        let a = email("a@x.com");
        new_account(&mut ledger, "a@x.com", dec!(100));

        let received = ledger
            .add_transaction(&a, tx(TransactionType::Received, dec!(50)))
            .unwrap();
        assert_eq!(ledger.get(&a).unwrap().balances(), Balances::new(dec!(150), dec!(150)));

        ledger
            .add_transaction(&a, tx(TransactionType::Payable, dec!(30)))
            .unwrap();
        assert_eq!(ledger.get(&a).unwrap().balances(), Balances::new(dec!(150), dec!(120)));

        ledger.remove_transaction(&a, received.id).unwrap();
        assert_eq!(ledger.get(&a).unwrap().balances(), Balances::new(dec!(100), dec!(70)));
        assert!(ledger.verify().is_empty());
    }

    #[test]
    fn test_transactions_most_recent_first() {
        let mut ledger = open();
        let a = email("a@x.com");
        new_account(&mut ledger, "a@x.com", dec!(0));

        let first = ledger.add_transaction(&a, tx(TransactionType::Paid, dec!(1))).unwrap();
        let second = ledger.add_transaction(&a, tx(TransactionType::Paid, dec!(2))).unwrap();

        let ids: Vec<_> = ledger.get(&a).unwrap().transactions.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_remove_unknown_transaction() {
        let mut ledger = open();
        let a = email("a@x.com");
        new_account(&mut ledger, "a@x.com", dec!(10));

        let id = TransactionId::new();
        let err = ledger.remove_transaction(&a, id).unwrap_err();
        assert_eq!(err, LedgerError::TransactionNotFound(id));
        assert_eq!(ledger.get(&a).unwrap().balances(), Balances::opening(dec!(10)));
    }

    #[test]
    fn test_state_survives_reopen() {
        let mut ledger = open();
        let a = email("a@x.com");
        new_account(&mut ledger, "a@x.com", dec!(100));
        ledger.add_transaction(&a, tx(TransactionType::Receivable, dec!(25))).unwrap();
        let before = ledger.accounts().to_vec();

        let reopened = LedgerStore::open(ledger.into_backend(), LedgerConfig::default()).unwrap();
        assert_eq!(reopened.accounts(), before.as_slice());
    }

    #[test]
    fn test_failed_write_changes_nothing() {
        let mut ledger = open();
        let a = email("a@x.com");
        new_account(&mut ledger, "a@x.com", dec!(100));
        let writes = ledger.backend().write_count();

        ledger.backend_mut().set_read_only(true);
        let err = ledger
            .add_transaction(&a, tx(TransactionType::Paid, dec!(40)))
            .unwrap_err();
        assert_eq!(err.error_code(), "STORAGE_ERROR");

        let account = ledger.get(&a).unwrap();
        assert_eq!(account.balances(), Balances::opening(dec!(100)));
        assert!(account.transactions.is_empty());
        assert_eq!(ledger.backend().write_count(), writes);

        ledger.backend_mut().clear_faults();
        ledger.reload().unwrap();
        assert_eq!(ledger.get(&a).unwrap().balances(), Balances::opening(dec!(100)));
    }

    #[test]
    fn test_snapshot_written_and_removed() {
        let mut ledger = open();
        let a = email("a@x.com");
        new_account(&mut ledger, "a@x.com", dec!(5));
        ledger.add_transaction(&a, tx(TransactionType::Paid, dec!(2))).unwrap();

        let blob = ledger.backend().load(&a.storage_key()).unwrap().unwrap();
        let snapshot = decode_account(&blob).unwrap();
        assert_eq!(&snapshot, ledger.get(&a).unwrap());

        ledger.delete_account(&a).unwrap();
        assert!(!ledger.backend().contains(&a.storage_key()).unwrap());
        assert!(ledger.accounts().is_empty());
    }

    #[test]
    fn test_snapshot_failure_is_not_fatal() {
        let mut ledger = open();
        let a = email("a@x.com");
        new_account(&mut ledger, "a@x.com", dec!(5));

        ledger.backend_mut().reject_writes_to(a.storage_key());
        ledger.add_transaction(&a, tx(TransactionType::Received, dec!(5))).unwrap();

        assert_eq!(ledger.get(&a).unwrap().current_balance, dec!(10));
        let reopened = LedgerStore::open(ledger.into_backend(), LedgerConfig::default()).unwrap();
        assert_eq!(reopened.get(&a).unwrap().current_balance, dec!(10));
    }

    #[test]
    fn test_snapshots_disabled() {
        let config = LedgerConfig {
            write_account_snapshots: false,
            ..LedgerConfig::default()
        };
        let mut ledger = LedgerStore::open(MemoryStore::new(), config).unwrap();
        new_account(&mut ledger, "a@x.com", dec!(5));

        assert_eq!(ledger.backend().keys().unwrap(), vec!["savedAccounts".to_string()]);
    }

    #[test]
    fn test_corrupt_collection_loads_empty() {
        let backend = MemoryStore::with_entries([("savedAccounts", "{not json")]);
        let ledger = LedgerStore::open(backend, LedgerConfig::default()).unwrap();
        assert!(ledger.accounts().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LedgerConfig {
            accounts_key: String::new(),
            ..LedgerConfig::default()
        };
        let err = LedgerStore::open(MemoryStore::new(), config).err().unwrap();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_filtered_transactions() {
        let mut ledger = open();
        let a = email("a@x.com");
        new_account(&mut ledger, "a@x.com", dec!(0));

        let may = Utc.with_ymd_and_hms(2025, 5, 5, 10, 0, 0).unwrap();
        let june = Utc.with_ymd_and_hms(2025, 6, 5, 10, 0, 0).unwrap();
        ledger.add_transaction(&a, tx(TransactionType::Paid, dec!(1)).on(may)).unwrap();
        ledger.add_transaction(&a, tx(TransactionType::Received, dec!(2)).on(may)).unwrap();
        ledger.add_transaction(&a, tx(TransactionType::Paid, dec!(3)).on(june)).unwrap();

        let all = ledger.transactions(&a, &TransactionFilter::new()).unwrap();
        assert!(!all.is_filter_active());
        assert_eq!(all.len(), 3);

        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
        );
        let filter = TransactionFilter::new()
            .with_type(TransactionType::Paid)
            .with_date_range(range);
        let paid_in_may = ledger.transactions(&a, &filter).unwrap();
        assert_eq!(paid_in_may.len(), 1);
        assert_eq!(paid_in_may.to_vec()[0].amount, dec!(1));
    }

    #[test]
    fn test_verify_reports_tampered_account() {
        let mut account = Account::new("A", email("a@x.com"), dec!(100));
        account.push_transaction(crate::transaction::Transaction::new(
            "x",
            dec!(10),
            TransactionType::Paid,
        ));
        let bytes = encode_accounts(&[account], BalanceRule::DualBalance).unwrap();
        let backend = MemoryStore::with_entries([("savedAccounts", bytes)]);

        let ledger = LedgerStore::open(backend, LedgerConfig::default()).unwrap();
        let mismatches = ledger.verify();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].stored, Balances::opening(dec!(100)));
        assert_eq!(mismatches[0].expected, Some(Balances::new(dec!(90), dec!(90))));
    }

    #[test]
    fn test_overflowing_add_is_rejected() {
        let mut ledger = open();
        let a = email("a@x.com");
        new_account(&mut ledger, "a@x.com", rust_decimal::Decimal::MAX);
        let writes = ledger.backend().write_count();

        let err = ledger
            .add_transaction(&a, tx(TransactionType::Received, dec!(1)))
            .unwrap_err();
        assert_eq!(err, LedgerError::invalid_input("amount", "balance out of range"));

        let account = ledger.get(&a).unwrap();
        assert_eq!(account.balances(), Balances::opening(rust_decimal::Decimal::MAX));
        assert!(account.transactions.is_empty());
        assert_eq!(ledger.backend().write_count(), writes);
        assert!(ledger.verify().is_empty());
    }

    #[test]
    fn test_overflowing_remove_is_rejected() {
        let mut ledger = open();
        let a = email("a@x.com");
        new_account(&mut ledger, "a@x.com", rust_decimal::Decimal::MAX);
        let paid = ledger
            .add_transaction(&a, tx(TransactionType::Paid, dec!(1)))
            .unwrap();
        ledger
            .add_transaction(&a, tx(TransactionType::Received, dec!(1)))
            .unwrap();

        let err = ledger.remove_transaction(&a, paid.id).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(ledger.get(&a).unwrap().transactions.len(), 2);
    }

    #[test]
    fn test_verify_reports_overflowing_history() {
        let mut account = Account::new("A", email("a@x.com"), rust_decimal::Decimal::MAX);
        account.push_transaction(Transaction::new(
            "x",
            rust_decimal::Decimal::MAX,
            TransactionType::Receivable,
        ));
        let bytes = encode_accounts(&[account], BalanceRule::DualBalance).unwrap();
        let backend = MemoryStore::with_entries([("savedAccounts", bytes)]);

        let ledger = LedgerStore::open(backend, LedgerConfig::default()).unwrap();
        let mismatches = ledger.verify();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].expected, None);
    }

    #[test]
    fn test_reopen_under_other_rule_refused() {
        let mut ledger = open();
        let a = email("a@x.com");
        new_account(&mut ledger, "a@x.com", dec!(100));
        ledger.add_transaction(&a, tx(TransactionType::Paid, dec!(40))).unwrap();
        let backend = ledger.into_backend();

        let config = LedgerConfig {
            balance_rule: BalanceRule::CurrentOnly,
            ..LedgerConfig::default()
        };
        let err = LedgerStore::open(backend.clone(), config).err().unwrap();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");

        let reopened = LedgerStore::open(backend, LedgerConfig::default()).unwrap();
        assert_eq!(reopened.get(&a).unwrap().balances(), Balances::new(dec!(60), dec!(60)));
    }

    #[test]
    fn test_legacy_collection_opens_under_any_rule() {
        let account = Account::new("A", email("a@x.com"), dec!(5));
        let bare = serde_json::to_vec(&[account]).unwrap();
        let backend = MemoryStore::with_entries([("savedAccounts", bare)]);

        let config = LedgerConfig {
            balance_rule: BalanceRule::CurrentOnly,
            ..LedgerConfig::default()
        };
        let ledger = LedgerStore::open(backend, config).unwrap();
        assert_eq!(ledger.accounts().len(), 1);
    }

    #[test]
    fn test_newer_collection_is_refused_and_kept() {
        let blob = r#"{"version": 99, "accounts": []}"#;
        let backend = MemoryStore::with_entries([("savedAccounts", blob)]);

        let err = LedgerStore::open(backend.clone(), LedgerConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "UNSUPPORTED_VERSION");
        assert_eq!(
            backend.load("savedAccounts").unwrap().unwrap(),
            blob.as_bytes().to_vec()
        );
    }
}
