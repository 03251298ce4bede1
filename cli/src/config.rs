//! CLI configuration.

use carihesap_common::env::{parse_flag, rejected};
use carihesap_ledger::LedgerConfig;
use carihesap_store::StoreConfig;

/// Main CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Storage backend configuration.
    pub store: StoreConfig,
    /// Ledger configuration.
    pub ledger: LedgerConfig,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit logs as JSON.
    pub log_json: bool,
    /// Environment values that could not be used; reported by `validate`.
    pub invalid_env: Vec<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            ledger: LedgerConfig::default(),
            log_level: "warn".to_string(),
            log_json: false,
            invalid_env: Vec::new(),
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, one variable name at a time.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self {
            store: StoreConfig::from_lookup(&lookup),
            ledger: LedgerConfig::from_lookup(&lookup),
            ..Self::default()
        };

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(flag) = lookup("CARI_LOG_JSON") {
            match parse_flag(&flag) {
                Ok(on) => config.log_json = on,
                Err(e) => config.invalid_env.push(rejected("CARI_LOG_JSON", &flag, e)),
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.invalid_env.is_empty() {
            return Err(self.invalid_env.join("; "));
        }
        self.store.validate()?;
        self.ledger.validate()?;

        if self.log_level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }

        Ok(())
    }
}
