//! Checkout route handler: cart + address -> persisted order.
//!
//! Composition is pure and validated in core; this handler owns the side
//! effects around it in a fixed sequence: compose, persist, then clear the
//! session cart. The address is taken from the request body and never stored
//! in the session.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use marigold_core::{NewOrder, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress};

use crate::db::OrderRepository;
use crate::error::Result;
use crate::routes::cart::{load_cart, save_cart};
use crate::state::AppState;

/// Flat shipping charged on every order.
const SHIPPING_COST: Decimal = Decimal::ZERO;

/// Request body for placing an order.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// Response after the order row exists.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Where the client goes next: the payment start endpoint for the card
    /// branch, nothing for cash on delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
}

/// POST /api/checkout
#[instrument(skip(state, session, request))]
pub async fn create_order(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let cart = load_cart(&session).await?;

    let order = NewOrder::compose(
        &cart,
        &request.shipping_address,
        SHIPPING_COST,
        request.payment_method,
    )?;

    let repo = OrderRepository::new(state.pool());
    let order_id = repo.create(&order, &request.shipping_address).await?;

    // The cart is cleared only after the order row exists; a failed persist
    // leaves the cart intact for a retry.
    let mut cleared = cart;
    cleared.clear();
    save_cart(&session, &cleared).await?;

    tracing::info!(
        order_id = %order_id,
        total = %order.total,
        payment_method = %order.payment_method,
        "order placed"
    );

    let payment_url = match request.payment_method {
        PaymentMethod::Paymob => Some(format!("/api/checkout/paymob?order_id={order_id}")),
        PaymentMethod::Cod => None,
    };

    Ok(Json(CheckoutResponse {
        order_id,
        status: order.status,
        payment_status: order.payment_status,
        payment_url,
    }))
}
