//! Identifier types for ledger entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix of the per-account storage key.
pub const ACCOUNT_KEY_PREFIX: &str = "account_";

/// Unique identifier for an account.
/// Uses UUID v7 for time-ordered identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Create a new account ID.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a new transaction ID.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account email, the lookup key in persistence.
///
/// Stored trimmed and lowercased so that two spellings of the same
/// address compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Create a normalized email.
    pub fn new(email: impl AsRef<str>) -> Self {
        Self(email.as_ref().trim().to_lowercase())
    }

    /// Get the email as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Basic shape check: one `@` with text on both sides.
    pub fn is_valid(&self) -> bool {
        match self.0.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !self.0.chars().any(char::is_whitespace)
            }
            None => false,
        }
    }

    /// Key of the per-account snapshot blob.
    pub fn storage_key(&self) -> String {
        format!("{}{}", ACCOUNT_KEY_PREFIX, self.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Email {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Email {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_id_creation() {
        let id1 = TransactionId::new();
        let id2 = TransactionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_transaction_id_parse() {
        let uuid_str = "019456ab-1234-7def-8901-234567890abc";
        let id = TransactionId::parse(uuid_str).unwrap();
        assert_eq!(id.to_string(), uuid_str);
        assert!(TransactionId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_email_normalization() {
        let email = Email::new("  Ayse@Example.COM ");
        assert_eq!(email.as_str(), "ayse@example.com");
        assert_eq!(email, Email::from("ayse@example.com"));
    }

    #[test]
    fn test_email_validation() {
        assert!(Email::new("a@x.com").is_valid());
        assert!(!Email::new("").is_valid());
        assert!(!Email::new("no-at-sign").is_valid());
        assert!(!Email::new("@x.com").is_valid());
        assert!(!Email::new("a@").is_valid());
        assert!(!Email::new("a@b@c").is_valid());
        assert!(!Email::new("a b@x.com").is_valid());
    }

    #[test]
    fn test_email_storage_key() {
        assert_eq!(Email::new("a@x.com").storage_key(), "account_a@x.com");
    }

    #[test]
    fn test_email_serializes_as_plain_string() {
        let json = serde_json::to_string(&Email::new("A@X.com")).unwrap();
        assert_eq!(json, "\"a@x.com\"");

        let back: Email = serde_json::from_str("\" B@Y.org\"").unwrap();
        assert_eq!(back.as_str(), "b@y.org");
    }
}
