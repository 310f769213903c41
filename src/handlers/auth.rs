//! Auth endpoints: register, login, refresh, logout, and `/api/me`.

use actix_web::{HttpResponse, web};

use crate::core::errors::AppResult;
use crate::domain::dto::auth::{LoginRequest, RegisterRequest, TokenRequest, UserResponse};
use crate::domain::models::authenticated_user::{AuthenticatedUser, OptionalUser};
use crate::services::auth::AuthService;

/// `POST /api/auth/register`
pub async fn register(
    auth: web::Data<AuthService>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let user = auth.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// `POST /api/auth/login`
pub async fn login(
    auth: web::Data<AuthService>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let pair = auth.login(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// `POST /api/auth/refresh`
pub async fn refresh(
    auth: web::Data<AuthService>,
    body: web::Json<TokenRequest>,
) -> AppResult<HttpResponse> {
    let pair = auth.refresh(&body.refresh_token).await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// `POST /api/auth/logout` — stateless tokens, nothing to revoke.
pub async fn logout(auth: web::Data<AuthService>, user: OptionalUser) -> HttpResponse {
    auth.logout(user.0.as_ref());
    HttpResponse::NoContent().finish()
}

/// `GET /api/me` — the resolved principal for the presented access token.
pub async fn me(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(user)
}
