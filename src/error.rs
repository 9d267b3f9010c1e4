use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A database pool error.
    #[error("Database pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The session store could not complete an operation.
    #[error("Session store error: {0}")]
    SessionStore(String),

    /// The request is missing a field or carries a malformed one.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The username is already registered.
    #[error("Username already exists")]
    DuplicateUsername,

    /// Unknown username or wrong password. Deliberately indistinguishable.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No live session accompanies the request.
    #[error("Unauthorized")]
    Unauthorized,

    /// The session is valid but the user it references is gone.
    #[error("User not found")]
    NotFound,

    /// A stored password hash could not be parsed.
    #[error("Invalid password hash format")]
    InvalidHashFormat,

    /// The session could not be destroyed.
    #[error("Logout failed: {0}")]
    Logout(String),

    /// A registration attempt failed.
    #[error("User registration failed: {0}")]
    Registration(Box<AppError>),

    /// A login attempt failed for a reason other than bad credentials.
    #[error("Login failed: {0}")]
    Login(Box<AppError>),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Wraps an error raised while registering a user.
    pub fn registration(err: AppError) -> Self {
        match err {
            AppError::Registration(_) => err,
            other => AppError::Registration(Box::new(other)),
        }
    }

    /// Wraps an error raised while logging in. Credential failures pass through untouched.
    pub fn login(err: AppError) -> Self {
        match err {
            AppError::InvalidCredentials | AppError::Login(_) => err,
            other => AppError::Login(Box::new(other)),
        }
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::DuplicateUsername
            | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Registration(inner) => inner.status(),
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Redis(_)
            | AppError::SessionStore(_)
            | AppError::InvalidHashFormat
            | AppError::Logout(_)
            | AppError::Login(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message that is safe to return to a client.
    fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::DuplicateUsername
            | AppError::InvalidCredentials
            | AppError::Unauthorized
            | AppError::NotFound => self.to_string(),
            AppError::Database(_) | AppError::Pool(_) => "Database error".to_string(),
            AppError::Redis(_) | AppError::SessionStore(_) => "Session store error".to_string(),
            AppError::Logout(_) => "Logout failed".to_string(),
            AppError::Registration(_) => "User registration failed".to_string(),
            AppError::Login(_) => "Login failed".to_string(),
            AppError::InvalidHashFormat | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }

    fn log(&self) {
        match self {
            AppError::Registration(inner) | AppError::Login(inner) => inner.log(),
            AppError::Validation(msg) => tracing::debug!("Validation error: {}", msg),
            AppError::DuplicateUsername => tracing::debug!("Duplicate username"),
            AppError::InvalidCredentials => tracing::warn!("Authentication failed"),
            AppError::Unauthorized => tracing::debug!("Unauthorized request"),
            AppError::NotFound => tracing::warn!("Session references a missing user"),
            other => tracing::error!("{}", other),
        }
    }

    fn body(&self) -> sonic_rs::Value {
        let message = self.public_message();
        match self {
            AppError::Registration(inner) => {
                let details = inner.public_message();
                sonic_rs::json!({ "error": message, "details": details })
            }
            _ => sonic_rs::json!({ "error": message }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status();
        let body = sonic_rs::to_string(&self.body())
            .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::DuplicateUsername.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_session_errors() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Logout("redis down".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_registration_keeps_inner_status_and_details() {
        let err = AppError::registration(AppError::DuplicateUsername);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let body = sonic_rs::to_string(&err.body()).unwrap();
        assert!(body.contains(r#""error":"User registration failed""#));
        assert!(body.contains(r#""details":"Username already exists""#));

        let err = AppError::registration(AppError::Internal("boom".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = sonic_rs::to_string(&err.body()).unwrap();
        assert!(!body.contains("boom"));
    }

    #[test]
    fn test_login_does_not_wrap_credential_failures() {
        assert!(matches!(
            AppError::login(AppError::InvalidCredentials),
            AppError::InvalidCredentials
        ));
        let err = AppError::login(AppError::SessionStore("down".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Login failed");
    }
}
