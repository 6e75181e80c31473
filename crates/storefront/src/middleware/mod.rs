//! Middleware for the storefront.

pub mod session;
