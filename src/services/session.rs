use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::{
    crypto::session_id::{generate_session_id, redact},
    error::{AppError, Result},
    models::session::Session,
    repositories::session::SessionStore,
};

/// How long a session (and its cookie) stays valid.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Creates, resolves and destroys sessions.
///
/// Expiry is checked lazily at lookup. Lookups never extend a session.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    /// Creates a new `SessionManager` with the standard TTL.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            ttl: SESSION_TTL,
        }
    }

    /// The TTL applied to new sessions.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Starts a session for a user.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The ID of the authenticated user.
    ///
    /// # Returns
    ///
    /// A `Result` containing the new session identifier.
    pub async fn create(&self, user_id: Uuid) -> Result<String> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| AppError::Internal(format!("Invalid session TTL: {}", e)))?;
        let now = Utc::now();

        let session = Session {
            session_id: generate_session_id(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        };

        self.store
            .save(&session, self.ttl)
            .await
            .map_err(into_session_store_error)?;

        tracing::info!(
            "✅ Session {}… created for user {}",
            redact(&session.session_id),
            user_id
        );
        Ok(session.session_id)
    }

    /// Resolves a session identifier to a user ID.
    ///
    /// Returns `None` if the session is absent, destroyed or expired. An
    /// expired record is removed on the way out.
    pub async fn get(&self, session_id: &str) -> Result<Option<Uuid>> {
        let Some(session) = self
            .store
            .load(session_id)
            .await
            .map_err(into_session_store_error)?
        else {
            tracing::debug!("Session {}… not found", redact(session_id));
            return Ok(None);
        };

        if session.is_expired_at(Utc::now()) {
            tracing::debug!("Session {}… expired", redact(session_id));
            if let Err(e) = self.store.remove(session_id).await {
                tracing::warn!("⚠️ Failed to remove expired session: {}", e);
            }
            return Ok(None);
        }

        Ok(Some(session.user_id))
    }

    /// Destroys a session. Destroying an absent session succeeds.
    pub async fn destroy(&self, session_id: &str) -> Result<()> {
        self.store
            .remove(session_id)
            .await
            .map_err(into_session_store_error)?;

        tracing::info!("✅ Session {}… destroyed", redact(session_id));
        Ok(())
    }
}

fn into_session_store_error(err: AppError) -> AppError {
    match err {
        AppError::SessionStore(_) => err,
        other => AppError::SessionStore(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemorySessionStore;

    fn manager() -> (SessionManager, MemorySessionStore) {
        let store = MemorySessionStore::new();
        (SessionManager::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (manager, _) = manager();
        let user_id = Uuid::new_v4();

        let session_id = manager.create(user_id).await.unwrap();
        assert_eq!(manager.get(&session_id).await.unwrap(), Some(user_id));
    }

    #[tokio::test]
    async fn test_sessions_are_distinct() {
        let (manager, _) = manager();
        let user_id = Uuid::new_v4();

        let first = manager.create(user_id).await.unwrap();
        let second = manager.create(user_id).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_session_is_absent() {
        let (manager, _) = manager();
        assert_eq!(manager.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let (manager, _) = manager();
        let session_id = manager.create(Uuid::new_v4()).await.unwrap();

        manager.destroy(&session_id).await.unwrap();
        assert_eq!(manager.get(&session_id).await.unwrap(), None);
        manager.destroy(&session_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_is_absent_and_removed() {
        let (manager, store) = manager();
        let now = Utc::now();
        let session = Session {
            session_id: "stale".to_string(),
            user_id: Uuid::new_v4(),
            created_at: now - chrono::Duration::hours(2),
            expires_at: now - chrono::Duration::hours(1),
        };
        store.save(&session, SESSION_TTL).await.unwrap();

        assert_eq!(manager.get("stale").await.unwrap(), None);
        assert!(!store.contains("stale").await);
    }

    #[tokio::test]
    async fn test_new_session_expires_after_one_hour() {
        let (manager, store) = manager();
        let session_id = manager.create(Uuid::new_v4()).await.unwrap();

        let session = store.load(&session_id).await.unwrap().unwrap();
        assert_eq!(session.expires_at - session.created_at, chrono::Duration::hours(1));
        assert!(session.is_expired_at(session.created_at + chrono::Duration::seconds(3600)));
        assert!(!session.is_expired_at(session.created_at + chrono::Duration::seconds(3599)));
    }

    #[tokio::test]
    async fn test_store_failures_propagate() {
        let (manager, store) = manager();
        let session_id = manager.create(Uuid::new_v4()).await.unwrap();
        store.set_failing(true);

        assert!(matches!(manager.create(Uuid::new_v4()).await, Err(AppError::SessionStore(_))));
        assert!(matches!(manager.destroy(&session_id).await, Err(AppError::SessionStore(_))));
        assert!(matches!(manager.get(&session_id).await, Err(AppError::SessionStore(_))));
    }
}
