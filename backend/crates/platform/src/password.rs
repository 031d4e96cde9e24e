//! Password Hashing and Verification
//!
//! NIST SP 800-63B flavored password handling:
//! - Argon2id hashing (memory-hard, recommended by OWASP)
//! - Zeroization of cleartext material
//! - NFKC normalization before validation
//! - Optional application-wide pepper

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Minimum password length (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Clear text password with automatic memory zeroization
///
/// Does not implement `Clone`; Debug output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Validate and wrap a raw password.
    ///
    /// Unicode is normalized with NFKC before validation, so visually
    /// identical inputs hash identically.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let len = normalized.chars().count();
        if len < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: len,
            });
        }
        if len > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: len,
            });
        }

        if normalized.chars().any(char::is_control) {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClearTextPassword(***)")
    }
}

/// Concatenate password bytes with the optional pepper.
fn peppered(password: &ClearTextPassword, pepper: Option<&[u8]>) -> Vec<u8> {
    let mut material = password.as_str().as_bytes().to_vec();
    if let Some(pepper) = pepper {
        material.extend_from_slice(pepper);
    }
    material
}

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(
    password: &ClearTextPassword,
    pepper: Option<&[u8]>,
) -> Result<String, PasswordHashError> {
    let mut material = peppered(password, pepper);
    let salt = SaltString::generate(&mut OsRng);

    let result = Argon2::default()
        .hash_password(&material, &salt)
        .map(|h| h.to_string())
        .map_err(|e| PasswordHashError::HashingFailed(e.to_string()));

    material.zeroize();
    result
}

/// Verify a password against a stored Argon2id hash.
pub fn verify_password(
    password: &ClearTextPassword,
    pepper: Option<&[u8]>,
    stored_hash: &str,
) -> Result<bool, PasswordHashError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;

    let mut material = peppered(password, pepper);
    let verified = Argon2::default().verify_password(&material, &parsed).is_ok();
    material.zeroize();

    Ok(verified)
}
