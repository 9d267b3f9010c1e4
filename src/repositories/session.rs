use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::time::Duration;

use crate::{
    error::{AppError, Result},
    models::session::Session,
};

/// Persistence for sessions, keyed by session identifier.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores a session, replacing any record with the same identifier.
    async fn save(&self, session: &Session, ttl: Duration) -> Result<()>;

    /// Loads a session by identifier.
    async fn load(&self, session_id: &str) -> Result<Option<Session>>;

    /// Removes a session. Removing an absent session is not an error.
    async fn remove(&self, session_id: &str) -> Result<()>;
}

/// A `SessionStore` backed by Redis.
///
/// Records are JSON under `{collection}:{session_id}` and expire on the Redis
/// side with the session TTL.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
    collection: String,
}

impl RedisSessionStore {
    /// Creates a new `RedisSessionStore`.
    pub fn new(redis: ConnectionManager, collection: impl Into<String>) -> Self {
        Self {
            redis,
            collection: collection.into(),
        }
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}:{}", self.collection, session_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, session: &Session, ttl: Duration) -> Result<()> {
        let session_json = sonic_rs::to_string(session)
            .map_err(|e| AppError::SessionStore(format!("Session serialization failed: {}", e)))?;

        let mut redis = self.redis.clone();
        let _: () = redis
            .set_ex(self.key(&session.session_id), &session_json, ttl.as_secs().max(1))
            .await
            .map_err(|e| {
                tracing::error!("❌ Redis set_ex failed: {}", e);
                AppError::Redis(e)
            })?;
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<Session>> {
        let mut redis = self.redis.clone();
        let session_json: Option<String> = redis.get(self.key(session_id)).await?;

        session_json
            .map(|json| {
                sonic_rs::from_str::<Session>(&json).map_err(|e| {
                    AppError::SessionStore(format!("Invalid session record: {}", e))
                })
            })
            .transpose()
    }

    async fn remove(&self, session_id: &str) -> Result<()> {
        let mut redis = self.redis.clone();
        let _: () = redis.del(self.key(session_id)).await.map_err(|e| {
            tracing::error!("❌ Redis del failed: {}", e);
            AppError::Redis(e)
        })?;
        Ok(())
    }
}
