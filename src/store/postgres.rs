use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{RefreshTokenRecord, RefreshTokenRepository, User, UserStore};
use crate::error::StoreError;

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, hashed_password, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, hashed_password, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, hashed_password, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $2, hashed_password = $3, updated_at = $4
            WHERE id = $1
            RETURNING id, email, hashed_password, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(hashed_password)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }
}

pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_hash, user_id, created_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&record.token_hash)
        .bind(record.user_id)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.revoked_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            SELECT token_hash, user_id, created_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn mark_revoked(&self, token_hash: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $1
            WHERE token_hash = $2 AND revoked_at IS NULL
            "#,
        )
        .bind(at)
        .bind(token_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $1
            WHERE user_id = $2 AND revoked_at IS NULL
            "#,
        )
        .bind(at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
