//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness check
//! GET    /health/ready                  - Readiness check (pings the database)
//!
//! # Catalog
//! GET    /api/products                  - Active catalog (cached)
//! GET    /api/products/{id}             - Product detail
//!
//! # Cart (session-backed)
//! GET    /api/cart                      - Current cart
//! POST   /api/cart/items                - Add a variant (merges duplicate lines)
//! PATCH  /api/cart/items/{line_id}      - Set a line's quantity (0 removes)
//! DELETE /api/cart/items/{line_id}      - Remove a line
//! DELETE /api/cart                      - Clear the cart
//!
//! # Checkout and payment
//! POST   /api/checkout                  - Snapshot cart + address into an order
//! GET    /api/checkout/paymob           - Start/resume the card payment flow
//! GET    /checkout/return               - Gateway redirect target (reconciler)
//!
//! # Newsletter
//! POST   /api/newsletter/subscribe      - Record a subscription
//! ```

pub mod cart;
pub mod checkout;
pub mod newsletter;
pub mod payment;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products::index))
        .route("/api/products/{id}", get(products::show))
        .route("/api/cart", get(cart::show).delete(cart::clear))
        .route("/api/cart/items", post(cart::add))
        .route(
            "/api/cart/items/{line_id}",
            patch(cart::update).delete(cart::remove),
        )
        .route("/api/checkout", post(checkout::create_order))
        .route("/api/checkout/paymob", get(payment::start))
        .route("/checkout/return", get(payment::gateway_return))
        .route("/api/newsletter/subscribe", post(newsletter::subscribe))
}
