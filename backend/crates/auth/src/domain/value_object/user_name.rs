//! User Name Value Object
//!
//! The public handle a user logs in with. Uppercase input is accepted
//! but the canonical form (used for uniqueness and lookups) is the
//! NFKC-normalized, lowercased string.
//!
//! ## Invariants
//! - 3 to 30 characters after normalization
//! - ASCII letters, digits and `_ . -` only
//! - Starts and ends with a letter, digit or `_`
//! - Contains at least one letter or digit
//! - Not a reserved word

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub const USER_NAME_MIN_LENGTH: usize = 3;
pub const USER_NAME_MAX_LENGTH: usize = 30;

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

/// Handles that collide with routes or operational accounts.
const RESERVED_WORDS: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "system",
    "superuser",
    "support",
    "api",
    "auth",
    "login",
    "logout",
    "register",
    "captcha",
    "me",
    "self",
    "anonymous",
    "guest",
    "null",
    "undefined",
];

/// User name validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("User name must be {USER_NAME_MIN_LENGTH}-{USER_NAME_MAX_LENGTH} characters")]
    InvalidLength,

    #[error("User name contains invalid characters")]
    InvalidCharacter,

    #[error("User name must start and end with a letter, digit or underscore")]
    InvalidBoundary,

    #[error("User name must contain at least one letter or digit")]
    NoAlphanumeric,

    #[error("User name is reserved")]
    Reserved,
}

/// Validated user name with original and canonical forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    /// Normalize (NFKC), validate, and canonicalize (lowercase).
    pub fn new(raw: &str) -> Result<Self, UserNameError> {
        let normalized: String = raw.trim().nfkc().collect();

        let len = normalized.chars().count();
        if !(USER_NAME_MIN_LENGTH..=USER_NAME_MAX_LENGTH).contains(&len) {
            return Err(UserNameError::InvalidLength);
        }

        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(&c))
        {
            return Err(UserNameError::InvalidCharacter);
        }

        let boundary_ok = |c: char| c.is_ascii_alphanumeric() || c == '_';
        let first = normalized.chars().next().unwrap();
        let last = normalized.chars().next_back().unwrap();
        if !boundary_ok(first) || !boundary_ok(last) {
            return Err(UserNameError::InvalidBoundary);
        }

        if !normalized.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(UserNameError::NoAlphanumeric);
        }

        let canonical = normalized.to_ascii_lowercase();

        if RESERVED_WORDS.contains(&canonical.as_str()) {
            return Err(UserNameError::Reserved);
        }

        Ok(Self {
            original: normalized,
            canonical,
        })
    }

    /// Rehydrate from stored columns without re-validation.
    pub fn from_stored(original: String, canonical: String) -> Self {
        Self {
            original,
            canonical,
        }
    }

    /// As the user typed it (display)
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Lowercased canonical form (uniqueness, lookups)
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["alice", "riyadh_center", "center-42", "A.B.C"] {
            assert!(UserName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_canonical_is_lowercase() {
        let name = UserName::new("RiyadhCenter").unwrap();
        assert_eq!(name.original(), "RiyadhCenter");
        assert_eq!(name.canonical(), "riyadhcenter");
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(UserName::new("ab"), Err(UserNameError::InvalidLength));
        assert_eq!(
            UserName::new(&"a".repeat(31)),
            Err(UserNameError::InvalidLength)
        );
        assert!(UserName::new(&"a".repeat(30)).is_ok());
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(
            UserName::new("has space"),
            Err(UserNameError::InvalidCharacter)
        );
        assert_eq!(UserName::new("has@at"), Err(UserNameError::InvalidCharacter));
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(UserName::new(".alice"), Err(UserNameError::InvalidBoundary));
        assert_eq!(UserName::new("alice-"), Err(UserNameError::InvalidBoundary));
        assert!(UserName::new("_alice_").is_ok());
    }

    #[test]
    fn test_requires_alphanumeric() {
        assert_eq!(UserName::new("___"), Err(UserNameError::NoAlphanumeric));
    }

    #[test]
    fn test_reserved_words() {
        assert_eq!(UserName::new("admin"), Err(UserNameError::Reserved));
        assert_eq!(UserName::new("Admin"), Err(UserNameError::Reserved));
        assert!(UserName::new("admin2").is_ok());
    }

    #[test]
    fn test_nfkc_normalization() {
        // Full-width letters normalize to ASCII
        let name = UserName::new("ａｌｉｃｅ").unwrap();
        assert_eq!(name.canonical(), "alice");
    }
}
