/// User Routes
///
/// Registration, credential change and the current identity.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Authenticator;
use crate::error::{AppError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::store::User;
use crate::validators::{is_present_password, is_valid_email};

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user; the password hash never leaves the server.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid email or empty password
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    authenticator: web::Data<Authenticator>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let email = is_valid_email(&form.email)?;
    is_present_password(&form.password)?;

    let user = authenticator.register(&email, &form.password).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User created"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PUT /api/users (protected)
///
/// Replaces email and password of the caller. Every refresh token the
/// caller holds is revoked.
pub async fn update_user(
    caller: web::ReqData<AuthenticatedUser>,
    form: web::Json<CredentialsRequest>,
    authenticator: web::Data<Authenticator>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update");
    let AuthenticatedUser(user_id) = caller.into_inner();

    let email = is_valid_email(&form.email)?;
    is_present_password(&form.password)?;

    let user = authenticator
        .change_password(user_id, &email, &form.password)
        .await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "User credentials updated"
    );

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// GET /api/me (protected)
pub async fn get_current_user(
    caller: web::ReqData<AuthenticatedUser>,
    authenticator: web::Data<Authenticator>,
) -> Result<HttpResponse, AppError> {
    let AuthenticatedUser(user_id) = caller.into_inner();
    let user = authenticator.current_user(user_id).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
