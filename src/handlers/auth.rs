use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use crate::{
    cookies::{clear_session_cookie, issue_session_cookie, read_session_id},
    error::{AppError, Result},
    state::AppState,
};

/// The request payload for registration and login.
///
/// Missing fields deserialize as empty strings and are rejected by validation.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

fn bad_body(rejection: JsonRejection) -> AppError {
    AppError::Validation(rejection.body_text())
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(payload) = payload.map_err(|e| AppError::registration(bad_body(e)))?;
    tracing::info!("📝 Register attempt for: {}", payload.username);

    let user = state
        .auth
        .register(&payload.username, &payload.password)
        .await
        .map_err(AppError::registration)?;

    tracing::info!("✅ User registered: {}", user.id);

    Ok((StatusCode::OK, MessageResponse::new("User registered successfully")).into_response())
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(payload) = payload.map_err(bad_body)?;
    tracing::info!("🔐 Login attempt for: {}", payload.username);

    let previous_session = read_session_id(&cookies);
    let session_id = state
        .auth
        .login(&payload.username, &payload.password, previous_session.as_deref())
        .await
        .map_err(AppError::login)?;

    issue_session_cookie(
        &cookies,
        session_id,
        state.auth.sessions().ttl(),
        state.secure_cookies,
    );

    tracing::info!("✅ Session cookie added for: {}", payload.username);

    Ok((StatusCode::OK, MessageResponse::new("Logged in!")).into_response())
}

/// Handles user logout.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Result<Response> {
    let session_id = read_session_id(&cookies);

    state.auth.logout(session_id.as_deref()).await?;
    clear_session_cookie(&cookies, state.secure_cookies);

    tracing::info!("👋 Logged out");

    Ok((StatusCode::OK, MessageResponse::new("Logged out!")).into_response())
}

/// Returns the profile of the logged-in user.
#[axum::debug_handler]
pub async fn profile(State(state): State<AppState>, cookies: Cookies) -> Result<Response> {
    let session_id = read_session_id(&cookies);
    let profile = state.auth.get_profile(session_id.as_deref()).await?;

    Ok((StatusCode::OK, Json(profile)).into_response())
}
