//! Token claims and paired token set.

use serde::{Deserialize, Serialize};

use crate::domain::entities::user::Role;

/// The two token flavors. They differ only in lifetime and in this tag; the
/// tag must match the verification context a token is presented to, so an
/// access token can never be replayed against the refresh endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    /// Wire value of the `typ` claim.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims carried inside a token.
///
/// Created fresh on every issuance and never persisted server-side: validity
/// is decided purely by signature, expiry and type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: user id (UUID string).
    pub sub: String,
    /// User role at issuance time.
    pub role: Role,
    /// Token flavor tag.
    pub typ: TokenType,
    /// Issued at (Unix timestamp, seconds).
    pub iat: i64,
    /// Expires at (Unix timestamp, seconds). Always strictly after `iat`.
    pub exp: i64,
    /// Unique token id, a fresh UUID v4 per issuance.
    pub jti: String,
}

/// Token set returned to the client by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}
