//! User store.
//!
//! The store is the one external collaborator of the token subsystem: the
//! identity resolver performs a single lookup per authenticated request. The
//! trait keeps that seam explicit and swappable; lookups return `Option`, so
//! a backend failure is indistinguishable from "not found" by design — the
//! caller treats both as an anonymous request.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::user::User;

/// Lookup-and-create capability over user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by id. `None` covers both "not found" and backend failure.
    async fn find_by_id(&self, id: Uuid) -> Option<User>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Option<User>;

    /// Insert a new user. Fails with a conflict if the username is taken.
    async fn insert(&self, user: User) -> AppResult<()>;
}

/// In-memory user store backed by a `RwLock<HashMap>`.
///
/// The persistence schema is out of scope for this service; this store backs
/// tests and local runs, and anything durable plugs in behind [`UserStore`].
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Option<User> {
        let users = self.users.read().ok()?;
        users.get(&id).cloned()
    }

    async fn find_by_username(&self, username: &str) -> Option<User> {
        let users = self.users.read().ok()?;
        users.values().find(|u| u.username == username).cloned()
    }

    async fn insert(&self, user: User) -> AppResult<()> {
        let mut users = self
            .users
            .write()
            .map_err(|_| AppError::InternalError("user store lock poisoned".into()))?;

        if users.values().any(|u| u.username == user.username) {
            return Err(AppError::ConflictError(format!(
                "username '{}' already exists",
                user.username
            )));
        }

        users.insert(user.id, user);
        Ok(())
    }
}
