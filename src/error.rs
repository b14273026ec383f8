/// Error Handling Module
///
/// Domain errors are defined per concern (authentication, persistence,
/// input validation) and converge on `AppError`, which is the only type the
/// HTTP layer renders.
///
/// Every credential or token failure renders as the same 401 body. The
/// internal sub-case is logged, never returned.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Authentication and token lifecycle errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password, empty password, unknown email or malformed stored hash
    #[error("credential mismatch")]
    CredentialMismatch,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("malformed token")]
    TokenMalformed,

    #[error("token expired")]
    TokenExpired,

    #[error("token signature invalid")]
    TokenSignatureInvalid,

    #[error("refresh token not found")]
    RefreshTokenNotFound,

    #[error("refresh token revoked")]
    RefreshTokenRevoked,

    #[error("refresh token expired")]
    RefreshTokenExpired,

    #[error("invalid api key")]
    InvalidApiKey,

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl AuthError {
    /// True for every failure caused by the presented credential rather than
    /// by the infrastructure.
    pub fn is_unauthorized(&self) -> bool {
        !matches!(
            self,
            AuthError::Hashing(_) | AuthError::Signing(_) | AuthError::Persistence(_)
        )
    }
}

/// Persistence errors surfaced by the user and refresh token stores
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("duplicate entry: {0}")]
    Conflict(String),

    #[error("record not found")]
    NotFound,

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Postgres reports unique violations with SQLSTATE 23505.
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err)
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                StoreError::Conflict(db_err.message().to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// Validation errors for request payloads
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("{0} is empty")]
    EmptyField(&'static str),

    #[error("{0} is too long (maximum {1} bytes)")]
    TooLong(&'static str, usize),

    #[error("{0} has invalid format")]
    InvalidFormat(&'static str),

    #[error("request payload could not be parsed")]
    InvalidPayload,
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            // Conflicts and lookups are not credential failures; keep their own status.
            AuthError::Persistence(store) => AppError::Store(store),
            other => AppError::Auth(other),
        }
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for correlating the response with server logs
    pub error_id: String,
    pub message: String,
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// The single body every credential or token failure renders as.
    pub fn unauthorized(error_id: String) -> Self {
        Self::new(
            error_id,
            "Unauthorized".to_string(),
            "UNAUTHORIZED".to_string(),
            StatusCode::UNAUTHORIZED.as_u16(),
        )
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let status = self.status_code();
        if status == StatusCode::UNAUTHORIZED {
            return (status, ErrorResponse::unauthorized(request_id.to_string()));
        }

        let (code, message) = match self {
            AppError::Validation(e) => ("VALIDATION_ERROR", e.to_string()),
            AppError::Store(StoreError::Conflict(_)) => {
                ("DUPLICATE_ENTRY", "Resource already exists".to_string())
            }
            AppError::Store(StoreError::NotFound) => ("NOT_FOUND", "Not found".to_string()),
            _ => ("INTERNAL_ERROR", "Internal server error".to_string()),
        };

        (
            status,
            ErrorResponse::new(
                request_id.to_string(),
                message,
                code.to_string(),
                status.as_u16(),
            ),
        )
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Auth(e) if e.is_unauthorized() => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication rejected");
            }
            AppError::Auth(e) => {
                tracing::error!(request_id = request_id, error = %e, "Authentication failure");
            }
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Store(StoreError::Conflict(_)) => {
                tracing::warn!(request_id = request_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Store(e) => {
                tracing::error!(request_id = request_id, error = %e, "Storage error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(e) if e.is_unauthorized() => StatusCode::UNAUTHORIZED,
            AppError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::Backend(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Per-request context attached to success and failure logs
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            operation: operation.into(),
        }
    }
}
