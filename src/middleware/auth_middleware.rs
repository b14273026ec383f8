/// Bearer Authentication Middleware
///
/// Validates the access token in the Authorization header and injects the
/// caller's identity into request extensions. Rejection happens before the
/// wrapped route runs.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::Authenticator;
use crate::error::AppError;

/// Identity of the caller of a protected route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

pub struct BearerAuth {
    authenticator: web::Data<Authenticator>,
}

impl BearerAuth {
    pub fn new(authenticator: web::Data<Authenticator>) -> Self {
        Self { authenticator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(BearerAuthService {
            service: Rc::new(service),
            authenticator: self.authenticator.clone(),
        }))
    }
}

pub struct BearerAuthService<S> {
    service: Rc<S>,
    authenticator: web::Data<Authenticator>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match self.authenticator.authorize_request(header) {
            Ok(user_id) => {
                req.extensions_mut().insert(AuthenticatedUser(user_id));
                tracing::debug!(user_id = %user_id, "Access token validated");

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                let error: Error = AppError::from(e).into();
                Box::pin(async move { Err(error) })
            }
        }
    }
}
