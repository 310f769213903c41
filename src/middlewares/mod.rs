//! Request middleware.
//!
//! Authentication and authorization are split into two layers. The identity
//! resolver ([`AuthMiddleware`]) turns a bearer token into a request-scoped
//! principal and never rejects a request; the role guard ([`RequireRole`])
//! is the layer that answers 401/403. Keeping rejection out of the resolver
//! means crypto-layer failures never leak to clients as anything other than
//! a uniform authorization failure.

pub mod auth_inner;
pub mod auth_middleware;
pub mod require_role;

pub use auth_middleware::AuthMiddleware;
pub use require_role::RequireRole;
