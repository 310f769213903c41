pub mod auth_service;
pub mod jwt_service;

pub use auth_service::AuthService;
pub use jwt_service::{JwtService, TokenError};
