/// JWT Claims structure
///
/// Payload of an access token: subject, issuer and the standard time claims
/// (RFC 7519). Nothing else is embedded.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// Issuer written into and required from every access token.
pub const ISSUER: &str = "chirpy";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: user_id.to_string(),
            iss: ISSUER.to_string(),
            iat,
            exp: iat + ttl.num_seconds(),
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// `AuthError::TokenMalformed` if the subject is not a UUID
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::TokenMalformed)
    }

    /// A token is dead from the second named by `exp` onward.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
