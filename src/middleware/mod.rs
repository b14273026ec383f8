/// Middleware module
///
/// Bearer authentication for protected routes and request logging.

mod auth_middleware;
mod logger;

pub use auth_middleware::{AuthenticatedUser, BearerAuth};
pub use logger::LoggerMiddleware;
