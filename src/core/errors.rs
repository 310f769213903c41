//! Application error handling.
//!
//! Subsystems raise their own typed errors ([`TokenError`], [`FieldCipherError`],
//! [`KeyLoadError`]); this module defines the single application-level error
//! that handlers return, and its mapping to HTTP responses. Crypto-layer
//! detail is deliberately flattened here: an invalid, expired or mistyped
//! token all surface to clients as 401 "authentication error", never as a
//! crypto error.
//!
//! ## HTTP mapping
//!
//! | `AppError`            | status |
//! |-----------------------|--------|
//! | `ValidationError`     | 400    |
//! | `NotFound`            | 404    |
//! | `ConflictError`       | 409    |
//! | `AuthenticationError` | 401    |
//! | `AuthorizationError`  | 403    |
//! | `InternalError`       | 500    |

use thiserror::Error;

use crate::services::auth::jwt_service::TokenError;
use crate::services::crypto::field_cipher::FieldCipherError;

/// Application-level error type, converted to an HTTP response by
/// `actix_web::ResponseError`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request payload failed validation. 400 Bad Request.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Requested resource does not exist. 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Business-rule conflict, e.g. duplicate username. 409 Conflict.
    #[error("Conflict error: {0}")]
    ConflictError(String),

    /// The caller's identity could not be established: bad credentials,
    /// invalid/expired token. 401 Unauthorized.
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Authenticated but not allowed. 403 Forbidden.
    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    /// Unexpected failure. 500 Internal Server Error. Includes field
    /// decryption failures: a card number that fails to decrypt is a storage
    /// read error, never an authentication problem.
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            // Token creation failing is a server bug or key problem, not the
            // caller's fault.
            TokenError::Creation(msg) => AppError::InternalError(msg),
            other => AppError::AuthenticationError(other.to_string()),
        }
    }
}

impl From<FieldCipherError> for AppError {
    fn from(err: FieldCipherError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::InternalError(format!("password hashing failed: {err}"))
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::http::StatusCode;

        let status = match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationError(_) => StatusCode::FORBIDDEN,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            log::error!("request failed: {self}");
        }

        actix_web::HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

/// Convenience alias used throughout the service layer.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;

    #[test]
    fn validation_error_maps_to_400() {
        let response = AppError::ValidationError("username required".into()).error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn authentication_error_maps_to_401() {
        let response = AppError::AuthenticationError("token expired".into()).error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn authorization_error_maps_to_403() {
        let response = AppError::AuthorizationError("admin only".into()).error_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn token_errors_flatten_to_authentication() {
        let err: AppError = TokenError::TokenExpired.into();
        assert!(matches!(err, AppError::AuthenticationError(_)));

        let err: AppError = TokenError::InvalidSignature.into();
        assert!(matches!(err, AppError::AuthenticationError(_)));
    }

    #[test]
    fn decryption_failure_is_internal_not_authentication() {
        let err: AppError = FieldCipherError::DecryptionFailed.into();
        assert!(matches!(err, AppError::InternalError(_)));
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
