//! Service entry point.
//!
//! Loads configuration and key material, constructs the token and crypto
//! services once, and starts the HTTP server. Any key or configuration
//! problem aborts startup — there is no degraded mode without keys.

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};
use dotenv::dotenv;
use env_logger::Env;
use log::info;

use card_auth_service::config::{EncryptionConfig, JwtConfig};
use card_auth_service::middlewares::AuthMiddleware;
use card_auth_service::repositories::users::{InMemoryUserStore, UserStore};
use card_auth_service::routes::configure_all_routes;
use card_auth_service::services::auth::{AuthService, JwtService};
use card_auth_service::services::crypto::FieldCipher;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let jwt_config = JwtConfig::from_env().expect("invalid JWT configuration");
    let encryption_config = EncryptionConfig::from_env().expect("invalid encryption configuration");

    let jwt = Arc::new(JwtService::from_config(&jwt_config).expect("failed to load JWT keys"));
    let field_cipher =
        FieldCipher::from_base64_key(&encryption_config.key_base64)
            .expect("invalid field encryption key");
    info!(
        "token service ready (access ttl {}s, refresh ttl {}s)",
        jwt_config.access_ttl_secs, jwt_config.refresh_ttl_secs
    );

    let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
    let auth_service = web::Data::new(AuthService::new(users.clone(), jwt.clone()));
    // Handed to the persistence layer as a transparent card-number converter.
    let field_cipher = web::Data::new(field_cipher);

    let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".into());
    info!("server listening on http://{bind_address}");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .wrap(AuthMiddleware::new(jwt.clone(), users.clone()))
            .app_data(auth_service.clone())
            .app_data(field_cipher.clone())
            .configure(configure_all_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}
