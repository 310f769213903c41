//! Role guard middleware.
//!
//! The authorization half: checks the principal the identity resolver bound
//! (or didn't) and answers 401/403 itself. This is the only place requests
//! are rejected for authentication reasons, which keeps the responses
//! uniform regardless of why verification failed upstream.

use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::{Error, HttpMessage, HttpResponse};
use futures_util::future::LocalBoxFuture;

use crate::domain::entities::user::Role;
use crate::domain::models::authenticated_user::AuthenticatedUser;

/// Guard requiring an authenticated principal with (at least) a given role.
pub struct RequireRole {
    required: Role,
}

impl RequireRole {
    pub fn new(required: Role) -> Self {
        Self { required }
    }

    /// Any authenticated user (admins included).
    pub fn user() -> Self {
        Self::new(Role::User)
    }

    /// Admins only.
    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireRoleService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service: Rc::new(service),
            required: self.required,
        }))
    }
}

pub struct RequireRoleService<S> {
    service: Rc<S>,
    required: Role,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let required = self.required;

        Box::pin(async move {
            let principal = req.extensions().get::<AuthenticatedUser>().cloned();

            match principal {
                None => {
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": "authentication_required",
                        "message": "a valid access token is required"
                    }));
                    let (req, _) = req.into_parts();
                    Ok(ServiceResponse::new(req, response).map_into_right_body())
                }
                Some(user) if !user.has_role(required) => {
                    log::warn!(
                        "user {} with role {} denied access (requires {})",
                        user.id,
                        user.role,
                        required
                    );
                    let response = HttpResponse::Forbidden().json(serde_json::json!({
                        "error": "insufficient_permissions",
                        "message": "access denied"
                    }));
                    let (req, _) = req.into_parts();
                    Ok(ServiceResponse::new(req, response).map_into_right_body())
                }
                Some(_) => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
            }
        })
    }
}
