/// Authentication module
///
/// Password hashing, access token (JWT) issuance and validation, refresh
/// token lifecycle, credential extraction, and the facade that ties them
/// together for the request layer.

mod authenticator;
mod bearer;
mod claims;
mod jwt;
mod password;
mod refresh_token;

pub use authenticator::{Authenticator, LoginSession};
pub use bearer::{extract_api_key, extract_bearer};
pub use claims::{Claims, ISSUER};
pub use jwt::generate_access_token;
pub use jwt::validate_access_token;
pub use password::{compute_password_hash, hash_password, verify_password};
pub use refresh_token::{generate_refresh_token, RefreshTokenStore, DEFAULT_REFRESH_TOKEN_TTL_DAYS};
