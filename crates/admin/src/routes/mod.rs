//! HTTP route handlers for the admin JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness check
//! GET    /health/ready                - Readiness check (pings the database)
//!
//! # Auth
//! POST   /api/auth/login              - Log in with the configured credentials
//! POST   /api/auth/logout             - Log out
//!
//! # Orders (authenticated)
//! GET    /api/orders                  - Recent orders, newest first
//! GET    /api/orders/stream           - Live order snapshots (SSE)
//! GET    /api/orders/{id}             - One order
//! GET    /api/orders/{id}/shipping    - The order's shipping address
//! PATCH  /api/orders/{id}/status      - Versioned status write (409 on races)
//! GET    /api/dashboard               - Summary numbers
//!
//! # Products (authenticated)
//! GET    /api/products                - Every product, any phase
//! POST   /api/products                - Phase 1: create a draft
//! POST   /api/products/{id}/images    - Phase 2: upload images (multipart)
//! PUT    /api/products/{id}           - Phase 3 / edits: finalize
//! DELETE /api/products/{id}           - Delete
//! ```

pub mod auth;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/orders", get(orders::index))
        .route("/api/orders/stream", get(orders::stream))
        .route("/api/orders/{id}", get(orders::show))
        .route("/api/orders/{id}/shipping", get(orders::shipping_address))
        .route("/api/orders/{id}/status", patch(orders::update_status))
        .route("/api/dashboard", get(orders::dashboard))
        .route("/api/products", get(products::index).post(products::create))
        .route("/api/products/{id}/images", post(products::upload_images))
        .route(
            "/api/products/{id}",
            put(products::finalize).delete(products::delete),
        )
}
