//! In-memory backend.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::gateway::{check_key, KeyValueStore};

/// In-memory blob store.
///
/// Writes can be made to fail on demand so callers can exercise their
/// failure paths without a real disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
    rejected_keys: BTreeSet<String>,
    read_only: bool,
    writes: u64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Reject every write and removal while set.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Reject writes to one key until cleared.
    pub fn reject_writes_to(&mut self, key: impl Into<String>) {
        self.rejected_keys.insert(key.into());
    }

    /// Clear all injected failures.
    pub fn clear_faults(&mut self) {
        self.read_only = false;
        self.rejected_keys.clear();
    }

    /// Number of successful writes and removals.
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_writable(&self, key: &str) -> StoreResult<()> {
        check_key(key)?;
        if self.read_only || self.rejected_keys.contains(key) {
            return Err(StoreError::WriteRejected(key.to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        check_key(key)?;
        let value = self.entries.get(key).cloned();
        debug!(key, hit = value.is_some(), "Memory store read");
        Ok(value)
    }

    fn save(&mut self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.check_writable(key)?;
        self.entries.insert(key.to_string(), value.to_vec());
        self.writes += 1;
        debug!(key, bytes = value.len(), "Memory store write");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.check_writable(key)?;
        if self.entries.remove(key).is_some() {
            self.writes += 1;
        }
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn contains(&self, key: &str) -> StoreResult<bool> {
        check_key(key)?;
        Ok(self.entries.contains_key(key))
    }
}
