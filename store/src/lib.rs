//! CariHesap Persistence Gateway
//!
//! Opaque key-value blob storage for ledger snapshots.
//!
//! # Backends
//!
//! - [`MemoryStore`]: in-process map, used by tests and scripted scenarios
//! - [`FileStore`]: one file per key under a data directory
//!
//! # Example
//!
//! ```rust,ignore
//! use carihesap_store::{KeyValueStore, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! store.save("savedAccounts", b"[]")?;
//! assert_eq!(store.load("savedAccounts")?, Some(b"[]".to_vec()));
//! ```

pub mod gateway;
pub mod memory;
pub mod file;
pub mod config;
pub mod error;

pub use gateway::KeyValueStore;
pub use memory::MemoryStore;
pub use file::FileStore;
pub use config::{StoreBackend, StoreConfig};
pub use error::{StoreError, StoreResult};
