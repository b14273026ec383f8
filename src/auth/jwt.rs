/// JWT Token Generation and Validation
///
/// Access tokens are HS256-signed JWTs and are never stored. Validity is
/// decided by signature, issuer and expiry alone.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ISSUER};
use crate::clock::Clock;
use crate::error::AuthError;

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Generate a new access token for a user
///
/// # Errors
/// `AuthError::Signing` if the secret is empty or encoding fails
pub fn generate_access_token(
    user_id: &Uuid,
    secret: &str,
    ttl: Duration,
    clock: &dyn Clock,
) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Signing("signing secret is empty".to_string()));
    }

    let claims = Claims::new(*user_id, clock.now(), ttl);

    encode(
        &Header::new(SIGNING_ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Validate an access token and return its subject
///
/// # Errors
/// - `TokenSignatureInvalid` if the signature does not verify under `secret`
/// - `TokenExpired` once the clock reaches `exp`
/// - `TokenMalformed` for anything else: bad structure, foreign algorithm,
///   wrong issuer, missing claims, or a subject that is not a UUID
pub fn validate_access_token(
    token: &str,
    secret: &str,
    clock: &dyn Clock,
) -> Result<Uuid, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::TokenSignatureInvalid);
    }

    let mut validation = Validation::new(SIGNING_ALGORITHM);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    // Expiry is checked below against the injected clock, with no leeway.
    validation.validate_exp = false;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => AuthError::TokenSignatureInvalid,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenMalformed,
    })?;

    if claims.is_expired_at(clock.now()) {
        return Err(AuthError::TokenExpired);
    }

    claims.user_id()
}
