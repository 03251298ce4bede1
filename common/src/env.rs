//! Helpers for reading settings from environment variables.

/// Parse an on/off setting. Accepts `1/true/yes/on` and `0/false/no/off`,
/// case-insensitively.
pub fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected on/off, got {:?}", other)),
    }
}

/// Record `key=value` as unusable.
pub fn rejected(key: &str, value: &str, reason: impl std::fmt::Display) -> String {
    format!("{}={:?}: {}", key, value, reason)
}
