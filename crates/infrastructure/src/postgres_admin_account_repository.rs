//! PostgreSQL-backed admin account repository.

use async_trait::async_trait;
use sqlx::PgPool;

use butik_application::{AdminAccount, AdminAccountRepository};
use butik_core::{AdminId, AppError, AppResult};

/// PostgreSQL implementation of the admin account repository port.
#[derive(Clone)]
pub struct PostgresAdminAccountRepository {
    pool: PgPool,
}

impl PostgresAdminAccountRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminAccountRow {
    id: uuid::Uuid,
    email: String,
    password_hash: String,
    display_name: String,
}

impl From<AdminAccountRow> for AdminAccount {
    fn from(row: AdminAccountRow) -> Self {
        Self {
            id: AdminId::from_uuid(row.id),
            email: row.email,
            password_hash: row.password_hash,
            display_name: row.display_name,
        }
    }
}

#[async_trait]
impl AdminAccountRepository for PostgresAdminAccountRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count admins: {error}")))?;

        Ok(count)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<AdminAccount>> {
        let row = sqlx::query_as::<_, AdminAccountRow>(
            r"
            SELECT id, email, password_hash, display_name
            FROM admin_accounts
            WHERE LOWER(email) = LOWER($1)
            LIMIT 1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find admin by email: {error}")))?;

        Ok(row.map(AdminAccount::from))
    }

    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        display_name: &str,
    ) -> AppResult<AdminAccount> {
        let row = sqlx::query_as::<_, AdminAccountRow>(
            r"
            INSERT INTO admin_accounts (id, email, password_hash, display_name, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, email, password_hash, display_name
            ",
        )
        .bind(AdminId::new().as_uuid())
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create admin: {error}")))?;

        Ok(AdminAccount::from(row))
    }
}
