/// Password Hashing and Verification
///
/// bcrypt with a fixed cost. Verification never distinguishes a malformed
/// stored hash from a wrong password.

use bcrypt::{hash, verify, DEFAULT_COST};
use lazy_static::lazy_static;

use crate::error::AuthError;

/// bcrypt only consumes the first 72 bytes; longer input is refused rather
/// than silently truncated.
const MAX_PASSWORD_BYTES: usize = 72;

lazy_static! {
    // Stand-in hash for logins against unknown accounts.
    static ref DUMMY_HASH: String =
        hash("chirpy-unknown-account", DEFAULT_COST).unwrap_or_default();
}

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `AuthError::Hashing` if the input cannot be processed
/// (longer than 72 bytes, or containing a NUL byte).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::Hashing(format!(
            "password exceeds {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    if password.as_bytes().contains(&0) {
        return Err(AuthError::Hashing("password contains a NUL byte".to_string()));
    }

    hash(password, DEFAULT_COST).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against its bcrypt hash
///
/// # Errors
/// Returns `AuthError::CredentialMismatch` for an empty password, a wrong
/// password, or a hash bcrypt cannot parse.
pub fn verify_password(hash: &str, password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::CredentialMismatch);
    }

    match verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AuthError::CredentialMismatch),
        Err(e) => {
            tracing::debug!(error = %e, "Stored password hash could not be parsed");
            Err(AuthError::CredentialMismatch)
        }
    }
}

/// Hash on the blocking pool so request workers stay responsive.
pub async fn compute_password_hash(password: String) -> Result<String, AuthError> {
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(|| hash_password(&password)))
        .await
        .map_err(|e| AuthError::Hashing(format!("hashing task failed: {}", e)))?
}

/// Verify on the blocking pool.
pub async fn verify_password_blocking(hash: String, password: String) -> Result<(), AuthError> {
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(|| verify_password(&hash, &password)))
        .await
        .map_err(|e| AuthError::Hashing(format!("verification task failed: {}", e)))?
}

/// Spend one full bcrypt verification on a throwaway hash.
///
/// Called when the account does not exist, so the response takes as long as
/// a wrong password for a real account.
pub async fn verify_dummy_password(password: String) {
    let _ = verify_password_blocking(DUMMY_HASH.clone(), password).await;
}
