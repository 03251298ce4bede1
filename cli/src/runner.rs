//! Scenario runner.

use std::collections::HashMap;

use anyhow::anyhow;
use carihesap_common::{Balances, Email, TransactionId};
use carihesap_ledger::{
    input::parse_balance, LedgerConfig, LedgerStore, NewAccount, NewTransaction,
};
use carihesap_store::MemoryStore;
use tracing::{debug, info, warn};

use crate::commands::ListFilter;
use crate::report::ScenarioReport;
use crate::scenario::{AssertCondition, FaultType, Scenario, ScenarioStep};

/// Runs scenarios against an in-memory ledger.
pub struct ScenarioRunner {
    ledger: LedgerStore<MemoryStore>,
    /// Transaction ids by scenario label.
    labels: HashMap<String, TransactionId>,
    /// Whether the most recent operation was rejected.
    last_failed: bool,
}

impl ScenarioRunner {
    /// Create a runner over an empty store.
    pub fn new(config: LedgerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            ledger: LedgerStore::open(MemoryStore::new(), config)?,
            labels: HashMap::new(),
            last_failed: false,
        })
    }

    /// Ledger under test.
    pub fn ledger(&self) -> &LedgerStore<MemoryStore> {
        &self.ledger
    }

    /// Run every step of a scenario.
    ///
    /// Rejected operations are expected outcomes and are counted, not
    /// raised. Only a malformed script aborts the run.
    pub fn run(&mut self, scenario: &Scenario) -> anyhow::Result<ScenarioReport> {
        info!("Running scenario: {} - {}", scenario.name, scenario.description);

        let mut report = ScenarioReport::new(&scenario.name);
        for (index, step) in scenario.steps.iter().enumerate() {
            match step {
                ScenarioStep::Assert { condition } => {
                    let outcome = self.check(condition);
                    if let Err(message) = &outcome {
                        warn!(step = index + 1, %message, "Assertion failed");
                    }
                    report.record_assertion(index, outcome);
                }
                _ => {
                    self.last_failed = !self.execute_step(step)?;
                    if self.last_failed {
                        report.record_rejection();
                    } else {
                        report.record_success();
                    }
                }
            }
        }

        Ok(report)
    }

    /// Execute one operation. Returns whether the ledger accepted it.
    fn execute_step(&mut self, step: &ScenarioStep) -> anyhow::Result<bool> {
        let result = match step {
            ScenarioStep::CreateAccount {
                name,
                email,
                balance,
            } => NewAccount::parse(name, email, balance.as_deref())
                .and_then(|input| self.ledger.create_account(input).map(|_| ())),
            ScenarioStep::AddTransaction {
                label,
                email,
                description,
                amount,
                kind,
                date,
            } => {
                let email = Email::new(email);
                let added = NewTransaction::parse(description, amount, kind, date.as_deref())
                    .and_then(|input| self.ledger.add_transaction(&email, input));
                added.map(|tx| {
                    self.labels.insert(label.clone(), tx.id);
                })
            }
            ScenarioStep::RemoveTransaction { email, label } => {
                let id = *self
                    .labels
                    .get(label)
                    .ok_or_else(|| anyhow!("Unknown transaction label: {}", label))?;
                self.ledger
                    .remove_transaction(&Email::new(email), id)
                    .map(|_| ())
            }
            ScenarioStep::DeleteAccount { email } => {
                self.ledger.delete_account(&Email::new(email)).map(|_| ())
            }
            ScenarioStep::InjectFault { fault } => {
                info!("Injecting fault {:?}", fault);
                let backend = self.ledger.backend_mut();
                match fault {
                    FaultType::StorageReadOnly => backend.set_read_only(true),
                    FaultType::RejectSnapshot { email } => {
                        backend.reject_writes_to(Email::new(email).storage_key())
                    }
                }
                Ok(())
            }
            ScenarioStep::ClearFaults => {
                info!("Clearing faults");
                self.ledger.backend_mut().clear_faults();
                Ok(())
            }
            ScenarioStep::Reopen => self.ledger.reload(),
            ScenarioStep::Assert { .. } => return Err(anyhow!("assertions are not operations")),
        };

        match result {
            Ok(()) => Ok(true),
            Err(e) => {
                debug!(error = %e, code = e.error_code(), "Step rejected");
                Ok(false)
            }
        }
    }

    fn check(&self, condition: &AssertCondition) -> Result<(), String> {
        match condition {
            AssertCondition::Balances {
                email,
                current,
                future,
            } => {
                let expected = Balances::new(
                    parse_balance(current).map_err(|e| e.to_string())?,
                    parse_balance(future).map_err(|e| e.to_string())?,
                );
                let actual = self.account_balances(email)?;
                check_eq(&format!("balances of {}", email), expected, actual)
            }
            AssertCondition::TransactionCount { email, count } => {
                let account = self
                    .ledger
                    .get(&Email::new(email))
                    .map_err(|e| e.to_string())?;
                check_eq(&format!("transactions of {}", email), *count, account.transactions.len())
            }
            AssertCondition::FilteredCount {
                email,
                kind,
                from,
                to,
                count,
            } => {
                let filter = ListFilter {
                    kind: kind.clone(),
                    from: from.clone(),
                    to: to.clone(),
                }
                .build()
                .map_err(|e| e.to_string())?;
                let view = self
                    .ledger
                    .transactions(&Email::new(email), &filter)
                    .map_err(|e| e.to_string())?;
                check_eq(&format!("filtered transactions of {}", email), *count, view.len())
            }
            AssertCondition::AccountCount { count } => {
                check_eq("account count", *count, self.ledger.accounts().len())
            }
            AssertCondition::LastStepFailed => {
                if self.last_failed {
                    Ok(())
                } else {
                    Err("previous step succeeded".to_string())
                }
            }
            AssertCondition::Consistent => {
                let found = self.ledger.verify();
                if found.is_empty() {
                    Ok(())
                } else {
                    Err(crate::output::mismatches(&found))
                }
            }
        }
    }

    fn account_balances(&self, email: &str) -> Result<Balances, String> {
        self.ledger
            .get(&Email::new(email))
            .map(|account| account.balances())
            .map_err(|e| e.to_string())
    }
}

fn check_eq<T: PartialEq + std::fmt::Display>(what: &str, expected: T, actual: T) -> Result<(), String> {
    if expected == actual {
        Ok(())
    } else {
        Err(format!("{}: expected {}, got {}", what, expected, actual))
    }
}
