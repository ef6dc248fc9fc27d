//! Argon2id password hashing.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),
    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            error!("Failed to hash password: {}", err);
            PasswordError::HashingFailed(err.to_string())
        })
}

/// `Ok(false)` on a wrong password, `Err` only when the stored hash is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|err| {
        error!("Invalid password hash format: {}", err);
        PasswordError::InvalidHashFormat
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => {
            debug!("Password mismatch");
            Ok(false)
        }
        Err(err) => {
            error!("Password verification error: {}", err);
            Err(PasswordError::VerificationFailed(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("secret123").unwrap();
        assert_ne!(hash, "secret123");
        assert!(verify_password("secret123", &hash).unwrap());
        assert!(!verify_password("secret124", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(verify_password("x", "not-a-hash"), Err(PasswordError::InvalidHashFormat)));
    }
}
