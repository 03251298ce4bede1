//! Store configuration.

use std::path::PathBuf;
use std::str::FromStr;

use carihesap_common::env::rejected;

use crate::file::FileStore;
use crate::gateway::KeyValueStore;
use crate::memory::MemoryStore;

/// Which backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Volatile, in-process.
    Memory,
    /// One file per key under the data directory.
    File,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StoreBackend::Memory),
            "file" | "fs" => Ok(StoreBackend::File),
            other => Err(format!("Unknown store backend: {}", other)),
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backend to use.
    pub backend: StoreBackend,
    /// Data directory for the file backend.
    pub data_dir: PathBuf,
    /// Environment values that could not be used; reported by `validate`.
    pub invalid_env: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            data_dir: PathBuf::from(".carihesap"),
            invalid_env: Vec::new(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, one variable name at a time.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(backend) = lookup("CARI_STORE_BACKEND") {
            match backend.parse() {
                Ok(parsed) => config.backend = parsed,
                Err(e) => config
                    .invalid_env
                    .push(rejected("CARI_STORE_BACKEND", &backend, e)),
            }
        }

        if let Some(dir) = lookup("CARI_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.invalid_env.is_empty() {
            return Err(self.invalid_env.join("; "));
        }

        if self.backend == StoreBackend::File && self.data_dir.as_os_str().is_empty() {
            return Err("Data directory cannot be empty".to_string());
        }

        Ok(())
    }

    /// Open the configured backend.
    pub fn open(&self) -> Box<dyn KeyValueStore> {
        match self.backend {
            StoreBackend::Memory => Box::new(MemoryStore::new()),
            StoreBackend::File => Box::new(FileStore::new(self.data_dir.clone())),
        }
    }
}
