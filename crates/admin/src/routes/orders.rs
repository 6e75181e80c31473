//! Staff order routes: listing, detail, live stream, status writes.
//!
//! The status write carries the version the staff UI loaded; a mismatch comes
//! back as 409 and the client re-fetches. The live stream is a polling
//! snapshot feed over SSE - each event is the full recent-orders list, so a
//! reconnecting client is complete again after one event.

use std::convert::Infallible;
use std::time::Duration;

use async_stream::stream;
use axum::{
    Json,
    extract::{Path, State},
    response::Sse,
    response::sse::{Event, KeepAlive},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use marigold_core::{Order, OrderId, OrderStatus, PaymentStatus, ShippingAddress};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAdminAuth;
use crate::services::dashboard::{DashboardStats, compute_stats};
use crate::state::AppState;

/// How many orders the list, stream and dashboard look at.
const RECENT_ORDERS_LIMIT: i64 = 200;

/// Seconds between stream snapshots.
const STREAM_POLL_SECONDS: u64 = 5;

/// GET /api/orders
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
) -> Result<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.pool());
    Ok(Json(repo.list(RECENT_ORDERS_LIMIT).await?))
}

/// GET /api/orders/{id}
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(order))
}

/// GET /api/orders/{id}/shipping
///
/// 404 covers both a missing order and the order-without-address gap left by
/// a failed second write at checkout.
#[instrument(skip(state, _admin))]
pub async fn shipping_address(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<ShippingAddress>> {
    let repo = OrderRepository::new(state.pool());
    let address = repo
        .get_shipping_address(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shipping address for order {id}")))?;
    Ok(Json(address))
}

/// Request body for a status write.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    /// Omitted means "keep the current payment status".
    pub payment_status: Option<PaymentStatus>,
    /// The version the client loaded; the write fails with 409 if it moved.
    pub version: i32,
}

/// PATCH /api/orders/{id}/status
#[instrument(skip(state, admin), fields(admin = %admin.username))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<OrderId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let repo = OrderRepository::new(state.pool());

    let payment_status = match request.payment_status {
        Some(payment_status) => payment_status,
        None => {
            repo.get(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("order {id}")))?
                .payment_status
        }
    };

    let updated = repo
        .update_status(id, request.status, payment_status, request.version)
        .await?;

    tracing::info!(
        order_id = %id,
        status = %updated.status,
        payment_status = %updated.payment_status,
        "order status updated"
    );

    Ok(Json(updated))
}

/// GET /api/orders/stream
///
/// Server-sent events; each event's data is the JSON recent-orders list. A
/// failed poll is reported as an `error` event and the stream keeps going.
#[instrument(skip(state, _admin))]
pub async fn stream(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
) -> Sse<impl futures::Stream<Item = std::result::Result<Event, Infallible>>> {
    let pool = state.pool().clone();

    let snapshots = stream! {
        let mut ticker = tokio::time::interval(Duration::from_secs(STREAM_POLL_SECONDS));
        loop {
            ticker.tick().await;

            let repo = OrderRepository::new(&pool);
            let event = match repo.list(RECENT_ORDERS_LIMIT).await {
                Ok(orders) => match serde_json::to_string(&orders) {
                    Ok(json) => Event::default().event("orders").data(json),
                    Err(e) => {
                        tracing::error!(error = %e, "order snapshot serialization failed");
                        Event::default().event("error").data("snapshot unavailable")
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "order snapshot query failed");
                    Event::default().event("error").data("snapshot unavailable")
                }
            };

            yield Ok::<Event, Infallible>(event);
        }
    };

    Sse::new(snapshots).keep_alive(KeepAlive::default())
}

/// GET /api/dashboard
#[instrument(skip(state, _admin))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
) -> Result<Json<DashboardStats>> {
    let repo = OrderRepository::new(state.pool());
    let orders = repo.list(RECENT_ORDERS_LIMIT).await?;
    Ok(Json(compute_stats(&orders, Utc::now())))
}
