//! Identity resolution logic for [`crate::middlewares::AuthMiddleware`].
//!
//! For each request: extract the bearer token, verify it as an access token,
//! look the subject up in the user store, and on success bind the principal
//! to the request extensions. Every failure — missing header, bad token,
//! vanished user — leaves the request anonymous and is only logged. This
//! middleware never returns an error and never short-circuits a response;
//! rejecting under-privileged requests is the role guard's job.

use std::rc::Rc;
use std::sync::Arc;

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, forward_ready};
use actix_web::http::header;
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::domain::models::authenticated_user::AuthenticatedUser;
use crate::domain::models::token::TokenType;
use crate::repositories::users::UserStore;
use crate::services::auth::JwtService;

pub struct AuthMiddlewareService<S> {
    pub(crate) service: Rc<S>,
    pub(crate) jwt: Arc<JwtService>,
    pub(crate) users: Arc<dyn UserStore>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let jwt = self.jwt.clone();
        let users = self.users.clone();

        Box::pin(async move {
            if let Some(principal) = resolve_identity(&req, &jwt, users.as_ref()).await {
                log::debug!(
                    "authenticated user {} with role {}",
                    principal.id,
                    principal.role
                );
                req.extensions_mut().insert(principal);
            }
            service.call(req).await
        })
    }
}

/// Resolve a request to a principal, or `None` for anonymous.
async fn resolve_identity(
    req: &ServiceRequest,
    jwt: &JwtService,
    users: &dyn UserStore,
) -> Option<AuthenticatedUser> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = auth_header.strip_prefix("Bearer ")?;

    let claims = match jwt.verify(token, TokenType::Access) {
        Ok(claims) => claims,
        Err(e) => {
            log::debug!("ignoring invalid bearer token: {e}");
            return None;
        }
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => {
            log::warn!("token subject is not a UUID: {}", claims.sub);
            return None;
        }
    };

    // The store treats lookup failure and "not found" identically.
    match users.find_by_id(user_id).await {
        Some(user) => Some(AuthenticatedUser::from(&user)),
        None => {
            log::warn!("user from token not found: {user_id}");
            None
        }
    }
}
