//! Ledger configuration.

use carihesap_common::env::{parse_flag, rejected};

use crate::balance::BalanceRule;

/// Key of the authoritative account collection.
pub const DEFAULT_ACCOUNTS_KEY: &str = "savedAccounts";

/// Ledger store configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Storage key holding every account.
    pub accounts_key: String,
    /// Also write a per-account snapshot under `account_<email>`.
    pub write_account_snapshots: bool,
    /// How settled transactions move the future balance.
    pub balance_rule: BalanceRule,
    /// Environment values that could not be used; reported by `validate`.
    pub invalid_env: Vec<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            accounts_key: DEFAULT_ACCOUNTS_KEY.to_string(),
            write_account_snapshots: true,
            balance_rule: BalanceRule::DualBalance,
            invalid_env: Vec::new(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, one variable name at a time.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(key) = lookup("CARI_ACCOUNTS_KEY") {
            config.accounts_key = key;
        }

        if let Some(flag) = lookup("CARI_WRITE_SNAPSHOTS") {
            match parse_flag(&flag) {
                Ok(on) => config.write_account_snapshots = on,
                Err(e) => config
                    .invalid_env
                    .push(rejected("CARI_WRITE_SNAPSHOTS", &flag, e)),
            }
        }

        if let Some(rule) = lookup("CARI_BALANCE_RULE") {
            match rule.parse() {
                Ok(parsed) => config.balance_rule = parsed,
                Err(e) => config
                    .invalid_env
                    .push(rejected("CARI_BALANCE_RULE", &rule, e)),
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.invalid_env.is_empty() {
            return Err(self.invalid_env.join("; "));
        }

        if self.accounts_key.trim().is_empty() {
            return Err("Accounts key cannot be empty".to_string());
        }

        if self.accounts_key.starts_with(carihesap_common::ACCOUNT_KEY_PREFIX) {
            return Err(format!(
                "Accounts key cannot start with {:?}; that prefix is reserved for account snapshots",
                carihesap_common::ACCOUNT_KEY_PREFIX
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.accounts_key, "savedAccounts");
        assert_eq!(config.balance_rule, BalanceRule::DualBalance);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = LedgerConfig::default();
        config.accounts_key = " ".to_string();
        assert!(config.validate().is_err());

        config.accounts_key = "account_all".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_lookup() {
        let config = LedgerConfig::from_lookup(|key| match key {
            "CARI_WRITE_SNAPSHOTS" => Some("off".to_string()),
            "CARI_BALANCE_RULE" => Some("current-only".to_string()),
            _ => None,
        });
        assert!(config.validate().is_ok());
        assert!(!config.write_account_snapshots);
        assert_eq!(config.balance_rule, BalanceRule::CurrentOnly);
    }

    #[test]
    fn test_unknown_env_values_rejected() {
        let config = LedgerConfig::from_lookup(|key| match key {
            "CARI_BALANCE_RULE" => Some("current_olny".to_string()),
            _ => None,
        });
        assert_eq!(config.balance_rule, BalanceRule::DualBalance);
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("CARI_BALANCE_RULE="));

        let config = LedgerConfig::from_lookup(|key| match key {
            "CARI_WRITE_SNAPSHOTS" => Some("ture".to_string()),
            _ => None,
        });
        assert!(config.write_account_snapshots);
        assert!(config.validate().unwrap_err().contains("CARI_WRITE_SNAPSHOTS"));
    }
}
