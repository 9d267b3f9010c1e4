use redis::aio::ConnectionManager;
use std::sync::Arc;

use crate::{
    config::Config,
    crypto::password::PasswordHasher,
    error::Result,
    repositories::{
        session::RedisSessionStore,
        user::PgUserStore,
    },
    services::{auth::AuthService, session::SessionManager},
};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The authentication service.
    pub auth: AuthService,
    /// Whether cookies are marked `Secure`.
    pub secure_cookies: bool,
}

impl AppState {
    /// Creates a new `AppState` connected to PostgreSQL and Redis.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        let users = PgUserStore::new(db);
        users.ensure_schema().await?;
        tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres");

        let redis_client = redis::Client::open(config.redis_url.as_str())?;
        let redis = ConnectionManager::new(redis_client).await?;
        let sessions = RedisSessionStore::new(redis, config.session_collection.clone());
        tracing::info!(
            "✅ Redis session store initialized (collection: {})",
            config.session_collection
        );

        let hasher = PasswordHasher::new()?;
        let auth = AuthService::new(
            Arc::new(users),
            hasher,
            SessionManager::new(Arc::new(sessions)),
        );

        Ok(Self::from_parts(auth, config.secure_cookies))
    }

    /// Assembles an `AppState` from already-built parts.
    pub fn from_parts(auth: AuthService, secure_cookies: bool) -> Self {
        AppState {
            auth,
            secure_cookies,
        }
    }
}
