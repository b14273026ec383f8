/// Authentication facade
///
/// Composes the password hasher, access token codec, refresh token store and
/// header extractors into the operations route handlers call. Secrets are
/// injected at construction; nothing here reads global state.

use std::sync::Arc;
use uuid::Uuid;

use crate::auth::bearer::{extract_api_key, extract_bearer};
use crate::auth::jwt::{generate_access_token, validate_access_token};
use crate::auth::password::{
    compute_password_hash, verify_dummy_password, verify_password_blocking,
};
use crate::auth::refresh_token::RefreshTokenStore;
use crate::clock::Clock;
use crate::configuration::AuthSettings;
use crate::error::{AuthError, StoreError};
use crate::store::{RefreshTokenRepository, User, UserStore};

/// Tokens handed out by a successful login
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn UserStore>,
    refresh_tokens: RefreshTokenStore,
    settings: AuthSettings,
    clock: Arc<dyn Clock>,
}

impl Authenticator {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_repository: Arc<dyn RefreshTokenRepository>,
        settings: AuthSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let refresh_tokens =
            RefreshTokenStore::new(refresh_repository, clock.clone(), settings.refresh_token_ttl());
        Self {
            users,
            refresh_tokens,
            settings,
            clock,
        }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Create a user with a freshly hashed password.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let hashed_password = compute_password_hash(password.to_string()).await?;
        let now = self.clock.now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password,
            created_at: now,
            updated_at: now,
        };

        self.users.insert_user(&user).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Verify credentials and issue one access token and one refresh token.
    ///
    /// Unknown email and wrong password are the same error, and cost the same
    /// bcrypt work.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AuthError> {
        let user = match self.users.find_user_by_email(email).await? {
            Some(user) => user,
            None => {
                verify_dummy_password(password.to_string()).await;
                return Err(AuthError::CredentialMismatch);
            }
        };

        verify_password_blocking(user.hashed_password.clone(), password.to_string()).await?;

        let access_token = generate_access_token(
            &user.id,
            &self.settings.jwt_secret,
            self.settings.access_token_ttl(),
            self.clock.as_ref(),
        )?;
        let refresh_token = self.refresh_tokens.issue(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginSession {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Resolve the caller of a protected request from its `Authorization`
    /// header. One signature check, no store lookup.
    pub fn authorize_request(&self, header: Option<&str>) -> Result<Uuid, AuthError> {
        let token = extract_bearer(header);
        validate_access_token(&token, &self.settings.jwt_secret, self.clock.as_ref())
    }

    /// Exchange the bearer refresh token for a new access token.
    pub async fn refresh(&self, header: Option<&str>) -> Result<String, AuthError> {
        let token = extract_bearer(header);
        self.refresh_tokens
            .validate_and_refresh(
                &token,
                &self.settings.jwt_secret,
                self.settings.access_token_ttl(),
            )
            .await
    }

    /// Revoke the bearer refresh token.
    ///
    /// Unknown and already-revoked tokens report success so callers cannot
    /// probe which tokens exist. Only infrastructure failures surface.
    pub async fn revoke_session(&self, header: Option<&str>) -> Result<(), AuthError> {
        let token = extract_bearer(header);
        if token.is_empty() {
            return Ok(());
        }

        match self.refresh_tokens.revoke(&token).await {
            Ok(()) | Err(AuthError::RefreshTokenNotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Revoke every refresh token a user holds, then replace their credentials.
    ///
    /// Revocation runs first: if it fails the credentials are untouched, and
    /// if the update fails no old session survives.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        email: &str,
        new_password: &str,
    ) -> Result<User, AuthError> {
        let hashed_password = compute_password_hash(new_password.to_string()).await?;
        self.refresh_tokens.revoke_all_for_user(user_id).await?;

        let user = self
            .users
            .update_credentials(user_id, email, &hashed_password, self.clock.now())
            .await?;
        Ok(user)
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::Persistence(StoreError::NotFound))
    }

    /// Check the static service key carried by webhook calls.
    pub fn authorize_api_key(&self, header: Option<&str>) -> Result<(), AuthError> {
        if extract_api_key(header) == self.settings.api_key {
            Ok(())
        } else {
            Err(AuthError::InvalidApiKey)
        }
    }
}
