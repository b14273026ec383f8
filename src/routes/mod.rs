mod auth;
mod chirps;
mod health_check;
mod users;

pub use auth::{login, refresh, revoke};
pub use chirps::validate_chirp;
pub use health_check::health_check;
pub use users::{create_user, get_current_user, update_user};

use actix_web::{http::header::AUTHORIZATION, HttpRequest};

/// Raw `Authorization` header value, if present and valid UTF-8.
fn authorization_header(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
}
