//! Shared primitives for all Rust crates in the Butik Emas backend.

#![forbid(unsafe_code)]

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Result type used across Butik Emas crates.
pub type AppResult<T> = Result<T, AppError>;

/// Identity of an authenticated admin, stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    /// Admin account identifier.
    pub admin_id: Uuid,
    /// Email the admin signed in with.
    pub email: String,
}

/// Identifier for an admin account row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdminId(Uuid);

impl AdminId {
    /// Creates a random admin identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an admin identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AdminId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for AdminId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is not authenticated or not allowed to access a resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but blocked by policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Caller exceeded an admission limit.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
