//! Identity resolver middleware registration.
//!
//! The actix `Transform` half; the per-request logic lives in
//! [`crate::middlewares::auth_inner`].

use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    Error, Result,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
};

use crate::middlewares::auth_inner::AuthMiddlewareService;
use crate::repositories::users::UserStore;
use crate::services::auth::JwtService;

/// Bearer-token identity resolver.
///
/// Holds the verifier and the user store explicitly; constructed once in
/// `main` and cloned per worker.
pub struct AuthMiddleware {
    jwt: Arc<JwtService>,
    users: Arc<dyn UserStore>,
}

impl AuthMiddleware {
    pub fn new(jwt: Arc<JwtService>, users: Arc<dyn UserStore>) -> Self {
        Self { jwt, users }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            jwt: self.jwt.clone(),
            users: self.users.clone(),
        }))
    }
}
