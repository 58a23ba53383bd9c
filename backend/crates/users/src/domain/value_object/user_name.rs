//! User Name Value Object
//!
//! The display name doubles as the local login identifier, so it is unique
//! across accounts. Case is preserved and compared exactly.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum display name length, in characters
pub const USER_NAME_MAX_LENGTH: usize = 64;

/// Trimmed, non-empty display name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    pub fn new(input: impl AsRef<str>) -> AppResult<Self> {
        let name = input.as_ref().trim();

        if name.is_empty() {
            return Err(AppError::bad_request("Name cannot be empty."));
        }

        let length = name.chars().count();
        if length > USER_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Name must be at most {USER_NAME_MAX_LENGTH} characters."
            )));
        }

        if name.chars().any(char::is_control) {
            return Err(AppError::bad_request("Name contains invalid characters."));
        }

        Ok(Self(name.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Same name with a numeric suffix, for resolving collisions
    pub fn with_suffix(&self, n: u32) -> Self {
        let suffix = format!("-{n}");
        let keep = USER_NAME_MAX_LENGTH - suffix.chars().count();
        let base: String = self.0.chars().take(keep).collect();
        Self(format!("{base}{suffix}"))
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserName {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_preserves_case() {
        let name = UserName::new("  Alice Smith ").unwrap();
        assert_eq!(name.as_str(), "Alice Smith");
    }

    #[test]
    fn test_rejects_empty_and_control() {
        assert!(UserName::new("").is_err());
        assert!(UserName::new("   ").is_err());
        assert!(UserName::new("ali\u{0000}ce").is_err());
    }

    #[test]
    fn test_length_limit() {
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_with_suffix_stays_within_limit() {
        let name = UserName::new("bob").unwrap();
        assert_eq!(name.with_suffix(2).as_str(), "bob-2");

        let long = UserName::new("x".repeat(USER_NAME_MAX_LENGTH)).unwrap();
        let suffixed = long.with_suffix(12);
        assert_eq!(suffixed.as_str().chars().count(), USER_NAME_MAX_LENGTH);
        assert!(suffixed.as_str().ends_with("-12"));
    }

    #[test]
    fn test_deserialize_validates() {
        let name: UserName = serde_json::from_str("\" carol \"").unwrap();
        assert_eq!(name.as_str(), "carol");
        assert!(serde_json::from_str::<UserName>("\"\"").is_err());
    }
}
