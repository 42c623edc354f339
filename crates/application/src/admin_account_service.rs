//! Admin account bootstrap and login.
//!
//! There is no self-service registration: the very first admin is created
//! through a setup endpoint gated by a deployment secret, and further
//! attempts are refused once any account exists.

use std::sync::Arc;

use butik_core::{AdminIdentity, AppError, AppResult};

use crate::ports::{AdminAccountRepository, PasswordHasher};

const MIN_PASSWORD_LENGTH: usize = 12;

/// Bootstraps the first admin account and authenticates logins.
pub struct AdminAccountService {
    accounts: Arc<dyn AdminAccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
    setup_key: String,
}

impl AdminAccountService {
    /// Creates the service. `setup_key` comes from deployment configuration.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AdminAccountRepository>,
        hasher: Arc<dyn PasswordHasher>,
        setup_key: String,
    ) -> Self {
        Self {
            accounts,
            hasher,
            setup_key,
        }
    }

    /// Creates the first admin account.
    ///
    /// Requires the deployment setup key and refuses outright once any
    /// admin exists, so the endpoint is inert on a provisioned system.
    pub async fn bootstrap(
        &self,
        setup_key: &str,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> AppResult<AdminIdentity> {
        if self.setup_key.is_empty() || setup_key != self.setup_key {
            return Err(AppError::Unauthorized("invalid setup key".to_owned()));
        }

        if self.accounts.count().await? > 0 {
            return Err(AppError::Conflict(
                "admin account already provisioned".to_owned(),
            ));
        }

        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation("invalid admin email".to_owned()));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(AppError::Validation("display name is required".to_owned()));
        }

        let hash = self.hasher.hash_password(password)?;
        let account = self.accounts.create(&email, &hash, display_name).await?;

        tracing::info!(email = %account.email, "akun admin pertama dibuat");
        Ok(AdminIdentity {
            admin_id: account.id.as_uuid(),
            email: account.email,
        })
    }

    /// Verifies a login attempt.
    ///
    /// Unknown emails and wrong passwords produce the same error so the
    /// endpoint does not reveal which emails have accounts.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AdminIdentity> {
        let email = email.trim().to_lowercase();
        let generic = || AppError::Unauthorized("Email atau password salah".to_owned());

        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or_else(generic)?;

        if !self.hasher.verify_password(password, &account.password_hash)? {
            tracing::warn!(email = %account.email, "percobaan login admin gagal");
            return Err(generic());
        }

        Ok(AdminIdentity {
            admin_id: account.id.as_uuid(),
            email: account.email,
        })
    }
}
