//! Error types for ledger operations.

use crate::{Email, TransactionId};
use thiserror::Error;

/// Main error type for ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// User input failed validation.
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    /// No account with this email.
    #[error("Account not found: {0}")]
    AccountNotFound(Email),

    /// An account with this email already exists.
    #[error("Account already exists: {0}")]
    DuplicateEmail(Email),

    /// No transaction with this id on the account.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Underlying storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored data was written by a newer format version.
    #[error("Stored data has format version {found}; this build reads up to {supported}")]
    UnsupportedVersion { found: u64, supported: u32 },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LedgerError {
    /// Shorthand for an input validation failure.
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        LedgerError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::InvalidInput { .. } => "INVALID_INPUT",
            LedgerError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            LedgerError::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            LedgerError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            LedgerError::Storage(_) => "STORAGE_ERROR",
            LedgerError::Serialization(_) => "SERIALIZATION_ERROR",
            LedgerError::UnsupportedVersion { .. } => "UNSUPPORTED_VERSION",
            LedgerError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
