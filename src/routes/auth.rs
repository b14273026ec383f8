/// Authentication Routes
///
/// Login, access token refresh and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::authorization_header;
use crate::auth::Authenticator;
use crate::error::{AppError, ErrorContext};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub id: Uuid,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// POST /api/login
///
/// # Errors
/// - 401: unknown email or wrong password (indistinguishable)
/// - 500: storage, hashing or signing failure
pub async fn login(
    form: web::Json<LoginRequest>,
    authenticator: web::Data<Authenticator>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let session = authenticator.login(&form.email, &form.password).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %session.user.id,
        "Login succeeded"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: session.user.id,
        email: session.user.email,
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: authenticator.settings().access_token_ttl_seconds,
    }))
}

/// POST /api/refresh
///
/// Requires `Authorization: Bearer <refresh_token>`. The refresh token is
/// not rotated.
///
/// # Errors
/// - 401: unknown, revoked or expired refresh token
pub async fn refresh(
    req: HttpRequest,
    authenticator: web::Data<Authenticator>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    let access_token = authenticator.refresh(authorization_header(&req)).await?;

    tracing::info!(request_id = %context.request_id, "Access token refreshed");

    Ok(HttpResponse::Ok().json(RefreshResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: authenticator.settings().access_token_ttl_seconds,
    }))
}

/// POST /api/revoke
///
/// Requires `Authorization: Bearer <refresh_token>`. Answers 204 whether or
/// not the token existed.
pub async fn revoke(
    req: HttpRequest,
    authenticator: web::Data<Authenticator>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_revoke");

    authenticator
        .revoke_session(authorization_header(&req))
        .await?;

    tracing::info!(request_id = %context.request_id, "Refresh token revocation processed");

    Ok(HttpResponse::NoContent().finish())
}
