//! Route configuration.

use actix_web::{HttpResponse, web};

use crate::handlers::auth;
use crate::middlewares::RequireRole;

/// Register all routes. The identity resolver is applied app-wide in `main`;
/// per-scope role guards decide who gets in.
pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));

    cfg.service(
        web::scope("/api/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/refresh", web::post().to(auth::refresh))
            .route("/logout", web::post().to(auth::logout)),
    );

    cfg.service(
        web::scope("/api")
            .wrap(RequireRole::user())
            .route("/me", web::get().to(auth::me)),
    );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
