/// Persistence seams for users and refresh tokens
///
/// The authentication core only depends on these traits. `postgres` backs
/// them with sqlx; `memory` keeps everything in a mutex-guarded map for tests
/// and local runs.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;

pub use memory::{InMemoryRefreshTokenRepository, InMemoryUserStore};
pub use postgres::{PgRefreshTokenRepository, PgUserStore};

/// A user row as the auth core sees it
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted refresh token.
///
/// `token_hash` is the SHA-256 hex digest of the opaque token handed to the
/// client; the plaintext never reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// # Errors
    /// `StoreError::Conflict` when the email is already registered
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Replace a user's email and password hash.
    ///
    /// # Errors
    /// `StoreError::NotFound` for an unknown id, `StoreError::Conflict` when
    /// the new email belongs to another user
    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<User, StoreError>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// # Errors
    /// `StoreError::Conflict` when the token hash already exists
    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), StoreError>;

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Set `revoked_at` if it is still null. Atomic per row.
    ///
    /// Returns `true` when this call performed the revocation, `false` when
    /// the row is missing or was already revoked.
    async fn mark_revoked(&self, token_hash: &str, at: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Revoke every live token of a user, returning how many were revoked.
    async fn revoke_all_for_user(&self, user_id: Uuid, at: DateTime<Utc>)
        -> Result<u64, StoreError>;
}
