//! Account and session flows: register, login, refresh, logout.
//!
//! This is the calling side of the token issuer: login and refresh are the
//! only places tokens are minted.

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::core::errors::{AppError, AppResult};
use crate::domain::dto::auth::{LoginRequest, RegisterRequest};
use crate::domain::entities::user::{Role, User};
use crate::domain::models::authenticated_user::AuthenticatedUser;
use crate::domain::models::token::{TokenPair, TokenType};
use crate::repositories::users::UserStore;
use crate::services::auth::jwt_service::JwtService;

/// Uniform message for every login failure; whether the username or the
/// password was wrong is not disclosed.
const BAD_CREDENTIALS: &str = "invalid username or password";

pub struct AuthService {
    store: Arc<dyn UserStore>,
    jwt: Arc<JwtService>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, jwt: Arc<JwtService>) -> Self {
        Self {
            store,
            jwt,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Lower hashing cost for tests; production always uses the default.
    #[cfg(test)]
    pub(crate) fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Register a new user with role USER.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        request
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let user = User {
            id: Uuid::new_v4(),
            username: request.username,
            password_hash: bcrypt::hash(&request.password, self.bcrypt_cost)?,
            role: Role::User,
        };
        self.store.insert(user.clone()).await?;

        log::info!("registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Verify credentials and issue a fresh token pair.
    pub async fn login(&self, request: LoginRequest) -> AppResult<TokenPair> {
        request
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let user = self
            .store
            .find_by_username(&request.username)
            .await
            .ok_or_else(|| AppError::AuthenticationError(BAD_CREDENTIALS.to_string()))?;

        if !bcrypt::verify(&request.password, &user.password_hash)? {
            log::debug!("password mismatch for user {}", user.username);
            return Err(AppError::AuthenticationError(BAD_CREDENTIALS.to_string()));
        }

        let principal = AuthenticatedUser::from(&user);
        let pair = self.jwt.issue_pair(&principal)?;
        log::debug!("issued token pair for user {}", user.id);
        Ok(pair)
    }

    /// Exchange a valid refresh token for a fresh token pair.
    ///
    /// The user is looked up again so that a deleted account cannot keep
    /// refreshing; the claims alone are not trusted for existence.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.jwt.verify(refresh_token, TokenType::Refresh)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::AuthenticationError("invalid token subject".to_string()))?;
        let user = self
            .store
            .find_by_id(user_id)
            .await
            .ok_or_else(|| AppError::AuthenticationError("unknown user".to_string()))?;

        let pair = self.jwt.issue_pair(&AuthenticatedUser::from(&user))?;
        Ok(pair)
    }

    /// Logout is a deliberate no-op: tokens are stateless and there is no
    /// server-side revocation store. Clients discard their tokens; anything
    /// already issued stays valid until it expires.
    pub fn logout(&self, principal: Option<&AuthenticatedUser>) {
        match principal {
            Some(user) => log::debug!("logout requested by user {} (no-op)", user.id),
            None => log::debug!("logout requested anonymously (no-op)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::users::InMemoryUserStore;
    use crate::services::auth::jwt_service::TokenError;
    use crate::services::auth::jwt_service::test_support::test_jwt_service;
    use chrono::Duration;

    fn auth_service() -> AuthService {
        let jwt = Arc::new(test_jwt_service(Duration::minutes(5), Duration::days(7)));
        AuthService::new(Arc::new(InMemoryUserStore::new()), jwt).with_bcrypt_cost(4)
    }

    fn register_request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: "correct horse battery".to_string(),
        }
    }

    #[actix_web::test]
    async fn register_then_login_issues_pair() {
        let svc = auth_service();
        let user = svc.register(register_request("alice")).await.unwrap();
        assert_eq!(user.role, Role::User);
        assert_ne!(user.password_hash, "correct horse battery");

        let pair = svc
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "correct horse battery".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(pair.expires_in, 300);
    }

    #[actix_web::test]
    async fn register_rejects_short_password() {
        let err = auth_service()
            .register(RegisterRequest {
                username: "bob".to_string(),
                password: "short".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[actix_web::test]
    async fn login_failures_are_uniform() {
        let svc = auth_service();
        svc.register(register_request("carol")).await.unwrap();

        let unknown_user = svc
            .login(LoginRequest {
                username: "nobody".to_string(),
                password: "whatever pass".to_string(),
            })
            .await
            .unwrap_err();
        let wrong_password = svc
            .login(LoginRequest {
                username: "carol".to_string(),
                password: "wrong password!".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(unknown_user.to_string(), wrong_password.to_string());
    }

    #[actix_web::test]
    async fn refresh_rotates_pair() {
        let svc = auth_service();
        svc.register(register_request("dave")).await.unwrap();
        let pair = svc
            .login(LoginRequest {
                username: "dave".to_string(),
                password: "correct horse battery".to_string(),
            })
            .await
            .unwrap();

        let rotated = svc.refresh(&pair.refresh_token).await.unwrap();
        assert_ne!(rotated.access_token, pair.access_token);
    }

    #[actix_web::test]
    async fn refresh_rejects_access_token() {
        let svc = auth_service();
        svc.register(register_request("erin")).await.unwrap();
        let pair = svc
            .login(LoginRequest {
                username: "erin".to_string(),
                password: "correct horse battery".to_string(),
            })
            .await
            .unwrap();

        let err = svc.refresh(&pair.access_token).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            AppError::from(TokenError::WrongTokenType).to_string()
        );
    }

    #[actix_web::test]
    async fn refresh_rejects_deleted_user() {
        // Token for a user that does not exist in the store.
        let jwt = Arc::new(test_jwt_service(Duration::minutes(5), Duration::days(7)));
        let svc = AuthService::new(Arc::new(InMemoryUserStore::new()), jwt.clone());

        let ghost = AuthenticatedUser {
            id: Uuid::new_v4(),
            role: Role::User,
        };
        let pair = jwt.issue_pair(&ghost).unwrap();

        let err = svc.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AppError::AuthenticationError(_)));
    }
}
