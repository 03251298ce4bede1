//! Scripted ledger scenarios.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// A scripted scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Steps in the scenario.
    pub steps: Vec<ScenarioStep>,
}

/// A step in a scenario.
///
/// Amounts and dates are kept as the text a user would type, so scripts
/// go through the same validation as the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenarioStep {
    /// Create an account.
    CreateAccount {
        name: String,
        email: String,
        #[serde(default)]
        balance: Option<String>,
    },
    /// Add a transaction and remember its id under `label`.
    AddTransaction {
        label: String,
        email: String,
        description: String,
        amount: String,
        kind: String,
        #[serde(default)]
        date: Option<String>,
    },
    /// Remove a previously added transaction.
    RemoveTransaction { email: String, label: String },
    /// Delete an account.
    DeleteAccount { email: String },
    /// Inject a storage fault.
    InjectFault { fault: FaultType },
    /// Clear all storage faults.
    ClearFaults,
    /// Drop in-memory state and load from storage again.
    Reopen,
    /// Assert a condition.
    Assert { condition: AssertCondition },
}

/// Storage faults that can be injected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FaultType {
    /// Every write fails.
    StorageReadOnly,
    /// Writes to one account's snapshot fail.
    RejectSnapshot { email: String },
}

/// Conditions that can be asserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssertCondition {
    /// Both balances of an account.
    Balances {
        email: String,
        current: String,
        future: String,
    },
    /// Number of transactions on an account.
    TransactionCount { email: String, count: usize },
    /// Number of transactions passing a filter.
    FilteredCount {
        email: String,
        #[serde(default)]
        kind: Option<String>,
        #[serde(default)]
        from: Option<String>,
        #[serde(default)]
        to: Option<String>,
        count: usize,
    },
    /// Number of accounts.
    AccountCount { count: usize },
    /// The previous step was rejected.
    LastStepFailed,
    /// Every account's balances match its history.
    Consistent,
}

impl Scenario {
    /// Names of the built-in scenarios.
    pub const BUILT_IN: [&'static str; 4] = [
        "balance-walkthrough",
        "filtering",
        "storage-failure",
        "account-lifecycle",
    ];

    /// Load a built-in scenario by name.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        match name {
            "balance-walkthrough" => Ok(Self::balance_walkthrough()),
            "filtering" => Ok(Self::filtering()),
            "storage-failure" => Ok(Self::storage_failure()),
            "account-lifecycle" => Ok(Self::account_lifecycle()),
            _ => Err(anyhow::anyhow!(
                "Unknown scenario: {} (available: {})",
                name,
                Self::BUILT_IN.join(", ")
            )),
        }
    }

    /// Load a scenario from a JSON file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// Received, payable, then undo the received one.
    fn balance_walkthrough() -> Self {
        Self {
            name: "balance-walkthrough".to_string(),
            description: "How each transaction type moves the two balances".to_string(),
            steps: vec![
                create("Ahmet", "ahmet@example.com", "100"),
                add("salary", "ahmet@example.com", "Maaş", "50", "received", None),
                balances("ahmet@example.com", "150", "150"),
                add("rent", "ahmet@example.com", "Kira", "30", "payable", None),
                balances("ahmet@example.com", "150", "120"),
                ScenarioStep::RemoveTransaction {
                    email: "ahmet@example.com".to_string(),
                    label: "salary".to_string(),
                },
                balances("ahmet@example.com", "100", "70"),
                add("market", "ahmet@example.com", "Market", "12,50", "ödendi", None),
                add("debt", "ahmet@example.com", "Borç", "40", "alınacak", None),
                balances("ahmet@example.com", "87.50", "97.50"),
                assert(AssertCondition::Consistent),
            ],
        }
    }

    /// Type and date filters, alone and combined.
    fn filtering() -> Self {
        Self {
            name: "filtering".to_string(),
            description: "Filter transactions by type and calendar day".to_string(),
            steps: vec![
                create("Zeynep", "zeynep@example.com", "0"),
                add("a", "zeynep@example.com", "Fatura", "10", "paid", Some("2025-05-01")),
                add("b", "zeynep@example.com", "Satış", "20", "received", Some("2025-05-02T23:59:59Z")),
                add("c", "zeynep@example.com", "Kira", "30", "paid", Some("2025-05-03")),
                add("d", "zeynep@example.com", "Alacak", "40", "receivable", Some("2025-05-04")),
                filtered("zeynep@example.com", None, None, None, 4),
                filtered("zeynep@example.com", Some("paid"), None, None, 2),
                filtered("zeynep@example.com", None, Some("2025-05-02"), Some("2025-05-03"), 2),
                filtered("zeynep@example.com", Some("paid"), Some("02.05.2025"), Some("03.05.2025"), 1),
                filtered("zeynep@example.com", None, Some("2025-05-05"), Some("2025-05-01"), 4),
                filtered("zeynep@example.com", Some("payable"), None, None, 0),
            ],
        }
    }

    /// Rejected writes leave the ledger untouched.
    fn storage_failure() -> Self {
        Self {
            name: "storage-failure".to_string(),
            description: "Failed writes roll back; snapshot failures do not".to_string(),
            steps: vec![
                create("Mehmet", "mehmet@example.com", "100"),
                ScenarioStep::InjectFault {
                    fault: FaultType::StorageReadOnly,
                },
                add("lost", "mehmet@example.com", "Lost", "25", "paid", None),
                assert(AssertCondition::LastStepFailed),
                balances("mehmet@example.com", "100", "100"),
                ScenarioStep::ClearFaults,
                ScenarioStep::InjectFault {
                    fault: FaultType::RejectSnapshot {
                        email: "mehmet@example.com".to_string(),
                    },
                },
                add("kept", "mehmet@example.com", "Kept", "25", "paid", None),
                balances("mehmet@example.com", "75", "75"),
                ScenarioStep::Reopen,
                balances("mehmet@example.com", "75", "75"),
                count("mehmet@example.com", 1),
                assert(AssertCondition::Consistent),
            ],
        }
    }

    /// Create, reject a duplicate, delete, then reuse the email.
    fn account_lifecycle() -> Self {
        Self {
            name: "account-lifecycle".to_string(),
            description: "Unique emails and account deletion".to_string(),
            steps: vec![
                create("Ayşe", "ayse@example.com", "-20"),
                create("Ali", "ali@example.com", ""),
                assert(AssertCondition::AccountCount { count: 2 }),
                create("Ayşe Again", "  AYSE@example.com ", "5"),
                assert(AssertCondition::LastStepFailed),
                assert(AssertCondition::AccountCount { count: 2 }),
                add("x", "ayse@example.com", "Borç", "10", "payable", None),
                balances("ayse@example.com", "-20", "-30"),
                ScenarioStep::DeleteAccount {
                    email: "ayse@example.com".to_string(),
                },
                assert(AssertCondition::AccountCount { count: 1 }),
                create("Ayşe", "ayse@example.com", "0"),
                count("ayse@example.com", 0),
                ScenarioStep::Reopen,
                assert(AssertCondition::AccountCount { count: 2 }),
            ],
        }
    }
}

fn create(name: &str, email: &str, balance: &str) -> ScenarioStep {
    ScenarioStep::CreateAccount {
        name: name.to_string(),
        email: email.to_string(),
        balance: Some(balance.to_string()),
    }
}

fn add(label: &str, email: &str, description: &str, amount: &str, kind: &str, date: Option<&str>) -> ScenarioStep {
    ScenarioStep::AddTransaction {
        label: label.to_string(),
        email: email.to_string(),
        description: description.to_string(),
        amount: amount.to_string(),
        kind: kind.to_string(),
        date: date.map(str::to_string),
    }
}

fn assert(condition: AssertCondition) -> ScenarioStep {
    ScenarioStep::Assert { condition }
}

fn balances(email: &str, current: &str, future: &str) -> ScenarioStep {
    assert(AssertCondition::Balances {
        email: email.to_string(),
        current: current.to_string(),
        future: future.to_string(),
    })
}

fn count(email: &str, count: usize) -> ScenarioStep {
    assert(AssertCondition::TransactionCount {
        email: email.to_string(),
        count,
    })
}

fn filtered(email: &str, kind: Option<&str>, from: Option<&str>, to: Option<&str>, count: usize) -> ScenarioStep {
    assert(AssertCondition::FilteredCount {
        email: email.to_string(),
        kind: kind.map(str::to_string),
        from: from.map(str::to_string),
        to: to.map(str::to_string),
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_built_ins() {
        for name in Scenario::BUILT_IN {
            let scenario = Scenario::load(name).unwrap();
            assert_eq!(scenario.name, name);
            assert!(!scenario.steps.is_empty());
        }
        assert!(Scenario::load("nope").is_err());
    }

    #[test]
    fn test_from_file() {
        let json = r#"{
            "name": "custom",
            "steps": [
                {"CreateAccount": {"name": "A", "email": "a@x.com", "balance": "10"}},
                {"Assert": {"condition": {"AccountCount": {"count": 1}}}},
                "Reopen"
            ]
        }"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let scenario = Scenario::from_file(file.path()).unwrap();
        assert_eq!(scenario.name, "custom");
        assert_eq!(scenario.steps.len(), 3);
        assert!(scenario.description.is_empty());
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Scenario::from_file(&dir.path().join("missing.json")).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"name\": 3}").unwrap();
        assert!(Scenario::from_file(file.path()).is_err());
    }
}
