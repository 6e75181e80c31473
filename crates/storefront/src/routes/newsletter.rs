//! Newsletter subscription route handler.
//!
//! The subscription is recorded first; the welcome email is best-effort and
//! never fails the request. SMTP being unconfigured just skips the send.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use marigold_core::Email;

use crate::db::SubscriberRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Where the subscription came from, recorded for later segmentation.
const SUBSCRIPTION_SOURCE: &str = "popup";

/// Request body for subscribing.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// Response after a successful subscription.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub subscribed: bool,
    pub email: String,
}

/// POST /api/newsletter/subscribe
#[instrument(skip(state, request))]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<SubscribeResponse>> {
    let normalized = request.email.trim().to_lowercase();
    let email = Email::parse(&normalized)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let repo = SubscriberRepository::new(state.pool());
    repo.insert(&email, SUBSCRIPTION_SOURCE).await?;

    tracing::info!(email = %email, "newsletter subscription recorded");

    // Welcome email after the write; a delivery failure is logged, not
    // surfaced, and the subscription stands.
    if let Some(mailer) = state.mailer() {
        if let Err(e) = mailer.send_welcome(&email).await {
            tracing::warn!(error = %e, "welcome email failed");
        }
    }

    Ok(Json(SubscribeResponse {
        subscribed: true,
        email: email.as_str().to_string(),
    }))
}
