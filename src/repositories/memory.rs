//! In-process stores for tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        session::Session,
        user::{User, UserProfile},
    },
    repositories::{session::SessionStore, user::UserStore},
};

/// A `UserStore` held in memory.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryUserStore {
    /// Creates a new, empty `MemoryUserStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a user by ID.
    pub async fn delete(&self, user_id: &Uuid) {
        let mut users = self.users.write().await;
        users.retain(|_, user| &user.id != user_id);
    }

    /// Returns the number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(AppError::DuplicateUsername);
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.insert(username.to_string(), user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn find_by_id(&self, user_id: &Uuid) -> Result<Option<UserProfile>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| &user.id == user_id)
            .cloned()
            .map(UserProfile::from))
    }
}

/// A `SessionStore` held in memory.
///
/// Expiry is left to the caller; records stay until removed. Writes can be
/// made to fail with [`MemorySessionStore::set_failing`].
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    failing: Arc<AtomicBool>,
}

impl MemorySessionStore {
    /// Creates a new, empty `MemorySessionStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with a session store error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns whether a record exists for the identifier.
    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::SessionStore("session store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &Session, _ttl: Duration) -> Result<()> {
        self.check()?;
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<Session>> {
        self.check()?;
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn remove(&self, session_id: &str) -> Result<()> {
        self.check()?;
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}
