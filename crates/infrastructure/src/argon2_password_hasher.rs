//! Argon2id password hasher for admin accounts.
//!
//! Parameters follow the OWASP password storage recommendation:
//! m=19456 (19 MiB), t=2, p=1.

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use butik_application::PasswordHasher as PasswordHasherPort;
use butik_core::{AppError, AppResult};

/// Argon2id implementation of the password hashing port.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Creates a hasher with the recommended parameters.
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(19456, 2, 1, None).unwrap_or_else(|_| Params::default());
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherPort for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|error| AppError::Internal(format!("failed to hash password: {error}")))?;

        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|error| {
            AppError::Internal(format!("failed to parse password hash: {error}"))
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(error) => Err(AppError::Internal(format!(
                "password verification failed: {error}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash_password("sangat-rahasia-sekali")?;
        assert!(hasher.verify_password("sangat-rahasia-sekali", &hash)?);
        Ok(())
    }

    #[test]
    fn wrong_password_is_rejected_without_error() -> AppResult<()> {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash_password("kata-sandi-benar")?;
        assert!(!hasher.verify_password("kata-sandi-salah", &hash)?);
        Ok(())
    }
}
