//! Password Hashing and Verification
//!
//! - Argon2id with a fresh random salt per password (PHC string output)
//! - Optional application-wide pepper appended before hashing
//! - Plaintext zeroized on drop and redacted from `Debug`

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Minimum password length, in code points
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length, in code points
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Password policy violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters.")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters.")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty.")]
    EmptyOrWhitespace,

    #[error("Password contains invalid characters.")]
    InvalidCharacter,
}

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Plaintext password as submitted by a form
///
/// NFKC-normalized, validated, never cloned and wiped from memory on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PlainPassword(String);

impl PlainPassword {
    /// Normalize and validate a submitted password
    pub fn new(raw: impl Into<String>) -> Result<Self, PasswordPolicyError> {
        let raw = Zeroizing::new(raw.into());
        let normalized: String = raw.nfkc().collect();
        let candidate = Self(normalized);

        if candidate.0.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let char_count = candidate.0.chars().count();
        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if candidate
            .0
            .chars()
            .any(|ch| ch.is_control() && ch != '\t')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(candidate)
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
        let mut bytes = self.0.as_bytes().to_vec();
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        Zeroizing::new(bytes)
    }

    /// Hash with Argon2id and a new random salt
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<StoredPassword, PasswordHashError> {
        let salt = SaltString::generate(OsRng);

        // Argon2id defaults: m=19456 KiB, t=2, p=1
        let hash = Argon2::default()
            .hash_password(&self.peppered(pepper), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(StoredPassword {
            phc: hash.to_string(),
        })
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PlainPassword").field(&"[REDACTED]").finish()
    }
}

/// Argon2id hash in PHC string format, safe to persist
#[derive(Clone, PartialEq, Eq)]
pub struct StoredPassword {
    phc: String,
}

impl StoredPassword {
    /// Load a PHC string read from the store
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let phc = s.into();
        PasswordHash::new(&phc).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { phc })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.phc
    }

    /// Check a plaintext against this hash (constant time inside argon2)
    pub fn verify(&self, password: &PlainPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.phc) else {
            return false;
        };

        Argon2::default()
            .verify_password(&password.peppered(pepper), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for StoredPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredPassword")
            .field("phc", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_rejections() {
        assert!(matches!(
            PlainPassword::new("short"),
            Err(PasswordPolicyError::TooShort { actual: 5, .. })
        ));
        assert!(matches!(
            PlainPassword::new("a".repeat(MAX_PASSWORD_LENGTH + 1)),
            Err(PasswordPolicyError::TooLong { .. })
        ));
        assert_eq!(
            PlainPassword::new("          ").unwrap_err(),
            PasswordPolicyError::EmptyOrWhitespace
        );
        assert_eq!(
            PlainPassword::new("abc\u{0007}defgh").unwrap_err(),
            PasswordPolicyError::InvalidCharacter
        );
    }

    #[test]
    fn test_unicode_password_accepted() {
        assert!(PlainPassword::new("パスワード安全です!").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let password = PlainPassword::new("correct horse battery").unwrap();
        let stored = password.hash(None).unwrap();

        assert_ne!(stored.as_phc_string(), "correct horse battery");
        assert!(stored.as_phc_string().starts_with("$argon2id$"));
        assert!(stored.verify(&password, None));

        let wrong = PlainPassword::new("incorrect horse battery").unwrap();
        assert!(!stored.verify(&wrong, None));
    }

    #[test]
    fn test_salt_differs_per_hash() {
        let password = PlainPassword::new("same password twice").unwrap();
        let first = password.hash(None).unwrap();
        let second = password.hash(None).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_pepper_must_match() {
        let password = PlainPassword::new("peppered password").unwrap();
        let stored = password.hash(Some(b"pepper".as_slice())).unwrap();

        assert!(stored.verify(&password, Some(b"pepper".as_slice())));
        assert!(!stored.verify(&password, None));
        assert!(!stored.verify(&password, Some(b"salt".as_slice())));
    }

    #[test]
    fn test_phc_string_load() {
        let password = PlainPassword::new("stored and loaded").unwrap();
        let stored = password.hash(None).unwrap();
        let loaded = StoredPassword::from_phc_string(stored.as_phc_string()).unwrap();
        assert!(loaded.verify(&password, None));

        assert!(StoredPassword::from_phc_string("plaintext").is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let password = PlainPassword::new("supersecret").unwrap();
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("supersecret"));
    }
}
