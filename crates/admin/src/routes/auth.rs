//! Staff login and logout.
//!
//! A single credential pair from configuration; success sets the identity in
//! the session and everything else checks for it via the extractor. Failed
//! attempts get a uniform 401 with no hint about which half was wrong.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::auth::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
}

/// POST /api/auth/login
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    if !state
        .config()
        .credentials_match(&request.username, &request.password)
    {
        tracing::warn!(username = %request.username, "failed admin login");
        return Err(AppError::Unauthorized);
    }

    let admin = CurrentAdmin {
        username: request.username,
    };
    set_current_admin(&session, &admin).await?;

    tracing::info!(username = %admin.username, "admin logged in");
    Ok(Json(LoginResponse {
        username: admin.username,
    }))
}

/// POST /api/auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_admin(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}
