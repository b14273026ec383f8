use actix_web::dev::Server;
use actix_web::{
    error::JsonPayloadError, guard, middleware::Logger, web, App, HttpRequest, HttpServer,
};
use std::net::TcpListener;

use crate::auth::Authenticator;
use crate::error::{AppError, ValidationError};
use crate::middleware::{BearerAuth, LoggerMiddleware};
use crate::routes::{
    create_user, get_current_user, health_check, login, refresh, revoke, update_user,
    validate_chirp,
};

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected request payload");
    AppError::from(ValidationError::InvalidPayload).into()
}

pub fn run(listener: TcpListener, authenticator: Authenticator) -> Result<Server, std::io::Error> {
    let authenticator = web::Data::new(authenticator);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(authenticator.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))

            .service(
                web::scope("/api")
                    // Protected routes (require a valid access token).
                    // The PUT guard lets POST /users fall through to the public resource.
                    .service(
                        web::resource("/users")
                            .guard(guard::Put())
                            .route(web::put().to(update_user))
                            .wrap(BearerAuth::new(authenticator.clone())),
                    )
                    .service(
                        web::resource("/me")
                            .route(web::get().to(get_current_user))
                            .wrap(BearerAuth::new(authenticator.clone())),
                    )

                    // Public routes
                    .route("/healthz", web::get().to(health_check))
                    .route("/users", web::post().to(create_user))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .route("/validate_chirp", web::post().to(validate_chirp)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
