//! The persistence gateway trait.

use crate::error::{StoreError, StoreResult};

/// Opaque key-value blob storage.
///
/// Values are raw bytes; the ledger decides what goes in them. Writes
/// replace the previous value for the key wholesale.
pub trait KeyValueStore {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    /// Read the blob stored under `key`, if any.
    fn load(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous blob.
    fn save(&mut self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Remove the blob under `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Whether a blob exists under `key`.
    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.load(key)?.is_some())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &[u8]) -> StoreResult<()> {
        (**self).save(key, value)
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        (**self).keys()
    }

    fn contains(&self, key: &str) -> StoreResult<bool> {
        (**self).contains(key)
    }
}

/// Reject keys no backend can hold.
pub(crate) fn check_key(key: &str) -> StoreResult<()> {
    if key.is_empty() || key.chars().any(char::is_control) {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
