/// Refresh Token Management
///
/// Refresh tokens are:
/// - 256 bits from the OS-seeded CSPRNG, hex encoded
/// - Hashed with SHA-256 before storage (never store plaintext)
/// - Valid for 60 days unless revoked
/// - Not rotated on refresh; they stay usable until expiry or revocation
///
/// `revoked_at` is written at most once and is never cleared.

use chrono::Duration;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::jwt::generate_access_token;
use crate::clock::Clock;
use crate::error::{AuthError, StoreError};
use crate::store::{RefreshTokenRecord, RefreshTokenRepository};

const TOKEN_BYTES: usize = 32;

/// Regeneration attempts when a fresh token collides with an existing row.
const MAX_ISSUE_ATTEMPTS: usize = 3;

pub const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 60;

/// Generate a new cryptographically secure refresh token
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a refresh token using SHA-256
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Clone)]
pub struct RefreshTokenStore {
    repository: Arc<dyn RefreshTokenRepository>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl RefreshTokenStore {
    pub fn new(
        repository: Arc<dyn RefreshTokenRepository>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            repository,
            clock,
            ttl,
        }
    }

    /// Issue and persist a refresh token for `user_id`
    ///
    /// Returns the plaintext token; only its hash is stored.
    ///
    /// # Errors
    /// `AuthError::Persistence` if the row cannot be written
    pub async fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        let mut attempt = 1;
        loop {
            let token = generate_refresh_token();
            let created_at = self.clock.now();
            let record = RefreshTokenRecord {
                token_hash: hash_token(&token),
                user_id,
                created_at,
                expires_at: created_at + self.ttl,
                revoked_at: None,
            };

            match self.repository.insert_refresh_token(&record).await {
                Ok(()) => {
                    tracing::debug!(user_id = %user_id, "Refresh token issued");
                    return Ok(token);
                }
                Err(StoreError::Conflict(_)) if attempt < MAX_ISSUE_ATTEMPTS => {
                    tracing::warn!(attempt, "Refresh token collision, regenerating");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Validate a refresh token
    ///
    /// Checks that the token exists, has not been revoked, and that the
    /// clock is still before `expires_at`.
    ///
    /// # Returns
    /// The owning user ID
    pub async fn validate(&self, token: &str) -> Result<Uuid, AuthError> {
        let record = self
            .repository
            .find_refresh_token(&hash_token(token))
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)?;

        if record.revoked_at.is_some() {
            tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
            return Err(AuthError::RefreshTokenRevoked);
        }

        if self.clock.now() >= record.expires_at {
            tracing::info!(user_id = %record.user_id, "Refresh token expired");
            return Err(AuthError::RefreshTokenExpired);
        }

        Ok(record.user_id)
    }

    /// Exchange a live refresh token for a new access token.
    ///
    /// The refresh token itself is left untouched.
    pub async fn validate_and_refresh(
        &self,
        token: &str,
        secret: &str,
        access_ttl: Duration,
    ) -> Result<String, AuthError> {
        let user_id = self.validate(token).await?;
        generate_access_token(&user_id, secret, access_ttl, self.clock.as_ref())
    }

    /// Revoke a single refresh token
    ///
    /// Revoking an already-revoked token succeeds and keeps the original
    /// `revoked_at`.
    ///
    /// # Errors
    /// `AuthError::RefreshTokenNotFound` for an unknown token
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let token_hash = hash_token(token);
        if self
            .repository
            .mark_revoked(&token_hash, self.clock.now())
            .await?
        {
            return Ok(());
        }

        match self.repository.find_refresh_token(&token_hash).await? {
            Some(_) => Ok(()),
            None => Err(AuthError::RefreshTokenNotFound),
        }
    }

    /// Revoke all refresh tokens for a user
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, AuthError> {
        let revoked = self
            .repository
            .revoke_all_for_user(user_id, self.clock.now())
            .await?;

        tracing::info!(user_id = %user_id, revoked, "All refresh tokens revoked for user");
        Ok(revoked)
    }
}
