use std::sync::Arc;
use zeroize::Zeroizing;

use crate::{
    crypto::password::PasswordHasher,
    error::{AppError, Result},
    models::user::UserProfile,
    repositories::user::UserStore,
    services::session::SessionManager,
    validation::auth::{validate_password, validate_username},
};

/// Orchestrates registration, login, logout and profile lookup.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    sessions: SessionManager,
}

impl AuthService {
    /// Creates a new `AuthService`.
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, sessions: SessionManager) -> Self {
        Self {
            users,
            hasher,
            sessions,
        }
    }

    /// The session manager backing this service.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Registers a new user.
    ///
    /// # Arguments
    ///
    /// * `username` - The requested username. Must be unique.
    /// * `password` - The plaintext password. Only its hash is stored.
    ///
    /// # Returns
    ///
    /// The public profile of the created user.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserProfile> {
        tracing::debug!("🔐 Registering user: {}", username);
        validate_username(username)?;
        validate_password(password)?;

        let password_hash = self.hash_password(password).await?;
        let user = self.users.create_user(username, &password_hash).await?;

        tracing::info!("✅ User created with ID: {}", user.id);
        Ok(user.into())
    }

    /// Authenticates a user and starts a session.
    ///
    /// An unknown username and a wrong password fail with the same
    /// `AppError::InvalidCredentials` and cost the same hashing work.
    ///
    /// # Arguments
    ///
    /// * `username` - The username to authenticate.
    /// * `password` - The plaintext password.
    /// * `previous_session` - The session the client already holds, if any.
    ///   It is destroyed once the new credentials check out.
    ///
    /// # Returns
    ///
    /// A `Result` containing the new session identifier.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        previous_session: Option<&str>,
    ) -> Result<String> {
        tracing::debug!("🔐 Authenticating user: {}", username);

        if username.is_empty() || password.is_empty() {
            return Err(AppError::InvalidCredentials);
        }

        let user = self.users.find_by_username(username).await?;
        let password = Zeroizing::new(password.to_string());
        let hasher = self.hasher.clone();

        let (user, verified) = tokio::task::spawn_blocking(move || match user {
            Some(user) => {
                let verified = hasher.verify(&password, &user.password_hash);
                (Some(user), verified)
            }
            None => (None, Ok(hasher.verify_dummy(&password))),
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?;

        let user = match (user, verified?) {
            (Some(user), true) => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        if let Some(previous) = previous_session {
            self.sessions.destroy(previous).await?;
        }

        let session_id = self.sessions.create(user.id).await?;
        tracing::info!("✅ User authenticated: {}", user.id);
        Ok(session_id)
    }

    /// Ends a session.
    ///
    /// Logging out without a session, or with one that no longer exists,
    /// succeeds. Only a session store failure is an error.
    pub async fn logout(&self, session_id: Option<&str>) -> Result<()> {
        let Some(session_id) = session_id else {
            tracing::debug!("Logout without a session cookie");
            return Ok(());
        };

        self.sessions
            .destroy(session_id)
            .await
            .map_err(|e| AppError::Logout(e.to_string()))
    }

    /// Returns the profile of the user owning the session.
    ///
    /// # Returns
    ///
    /// `AppError::Unauthorized` when there is no live session, and
    /// `AppError::NotFound` when the session's user no longer exists.
    pub async fn get_profile(&self, session_id: Option<&str>) -> Result<UserProfile> {
        let session_id = session_id.ok_or(AppError::Unauthorized)?;
        let user_id = self
            .sessions
            .get(session_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        self.users.find_by_id(&user_id).await?.ok_or(AppError::NotFound)
    }

    async fn hash_password(&self, password: &str) -> Result<String> {
        let hasher = self.hasher.clone();
        let password = Zeroizing::new(password.to_string());

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }
}
