use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{RefreshTokenRecord, RefreshTokenRepository, User, UserStore};
use crate::error::StoreError;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = lock(&self.users)?;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("email {} exists", user.email)));
        }
        if users.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("user {} exists", user.id)));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = lock(&self.users)?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = lock(&self.users)?;
        Ok(users.get(&id).cloned())
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let mut users = lock(&self.users)?;
        if users.values().any(|u| u.email == email && u.id != id) {
            return Err(StoreError::Conflict(format!("email {} exists", email)));
        }
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = updated_at;
        Ok(user.clone())
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: Mutex<HashMap<String, RefreshTokenRecord>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
        let mut tokens = lock(&self.tokens)?;
        if tokens.contains_key(&record.token_hash) {
            return Err(StoreError::Conflict("refresh token exists".to_string()));
        }
        tokens.insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let tokens = lock(&self.tokens)?;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn mark_revoked(&self, token_hash: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut tokens = lock(&self.tokens)?;
        match tokens.get_mut(token_hash) {
            Some(record) if record.revoked_at.is_none() => {
                record.revoked_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut tokens = lock(&self.tokens)?;
        let mut revoked = 0;
        for record in tokens
            .values_mut()
            .filter(|r| r.user_id == user_id && r.revoked_at.is_none())
        {
            record.revoked_at = Some(at);
            revoked += 1;
        }
        Ok(revoked)
    }
}
