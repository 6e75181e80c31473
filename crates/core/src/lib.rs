//! Marigold Core - Shared domain types and pure commerce logic.
//!
//! This crate provides the common types used across all Marigold components:
//! - `storefront` - Public-facing shop (catalog, cart, checkout, payment)
//! - `admin` - Internal staff panel (orders, products, uploads)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. Everything in here is synchronous and
//! deterministic, which is also where the cart and stock test coverage lives.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, and statuses
//! - [`cart`] - The buyer's cart: line items keyed by (product, color, size)
//! - [`stock`] - Per-variant stock resolution with the sparse-key fallback chain
//! - [`catalog`] - Canonical product shape and the buyer-facing view adapter
//! - [`order`] - Order composition and validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod stock;
pub mod types;

pub use cart::{Cart, CartItem, LineId};
pub use catalog::{Product, ProductPhase, ProductView};
pub use order::{
    CustomerSummary, GatewayRefs, NewOrder, Order, OrderItem, ShippingAddress, ValidationError,
};
pub use stock::Stock;
pub use types::*;
