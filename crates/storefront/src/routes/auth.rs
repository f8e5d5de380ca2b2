//! Authentication route handlers.
//!
//! Login stores a [`CurrentUser`] in the session; admin routes re-check the
//! user against storage on every request.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{ApiJson, AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, auth_rate_limiter, clear_current_user, set_current_user};
use crate::models::{CurrentUser, UserInfo};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login).layer(auth_rate_limiter()))
        .route("/logout", post(logout))
        .route("/session", get(session_info))
}

/// Login request body. Missing fields deserialize as empty strings so they
/// get the same 400 as blank ones.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn session_error(e: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("Session error: {e}"))
}

/// Handle login.
#[instrument(skip(state, session, body), fields(username = %body.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<UserInfo>> {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(AuthError::MissingUsername.into());
    }

    let user = match AuthService::new(state.storage())
        .validate_user(body.username.trim(), &body.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(error = %e, "Login failed");
            return Err(e.into());
        }
    };

    // New session id on privilege change
    session.cycle_id().await.map_err(session_error)?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current).await.map_err(session_error)?;

    set_sentry_user(&user.id, &user.username);
    tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User logged in");

    Ok(Json(UserInfo::from(&user)))
}

/// Handle logout.
pub async fn logout(session: Session) -> Result<Json<MessageResponse>> {
    clear_current_user(&session).await.map_err(session_error)?;
    session.flush().await.map_err(session_error)?;
    clear_sentry_user();

    Ok(Json(MessageResponse {
        message: "Logged out successfully",
    }))
}

/// Return the logged-in user as currently stored.
pub async fn session_info(
    State(state): State<AppState>,
    OptionalAuth(current): OptionalAuth,
) -> Result<Json<UserInfo>> {
    let current = current.ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let user = state
        .storage()
        .get_user(current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    Ok(Json(UserInfo::from(&user)))
}
