//! CariHesap Common Types
//!
//! This crate contains shared types used across the CariHesap ledger,
//! including identifiers, money helpers, day-granularity time helpers,
//! environment parsing helpers and the ledger error type.

pub mod identifiers;
pub mod monetary;
pub mod error;
pub mod time;
pub mod env;

pub use identifiers::*;
pub use monetary::*;
pub use error::*;
pub use time::*;
